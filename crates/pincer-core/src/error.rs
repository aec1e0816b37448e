use thiserror::Error;

/// Top-level error type for the pincer crates.
#[derive(Debug, Error)]
pub enum PincerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors returned by the jaw-width solver and the placement composer.
///
/// Copy + static messages, these are returned on every control tick.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum KinematicsError {
    /// The caller broke an input contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// The two placement directions are parallel (or zero), so no x axis exists.
    ///
    /// `cross_norm` is `|y x z| / (|y| |z|)`, the sine of the angle between them.
    #[error("Degenerate frame: |y x z| / (|y| |z|) = {cross_norm}")]
    DegenerateFrame { cross_norm: f32 },
}

/// Specific contract violations wrapped by [`KinematicsError::InvalidArgument`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ArgumentError {
    #[error("jaw width {width} outside [{min}, {max}]")]
    JawWidthOutOfRange { width: f32, min: f32, max: f32 },

    #[error("jaw width is not finite")]
    NonFiniteJawWidth,

    #[error("y and z directions are not orthogonal (y.z = {dot})")]
    NonOrthogonal { dot: f32 },

    #[error("{axis} direction is not unit length (|{axis}| = {norm})")]
    NotUnitLength { axis: char, norm: f32 },

    #[error("{what} contains NaN or Inf")]
    NonFiniteVector { what: &'static str },
}

impl KinematicsError {
    /// Whether this error is a caller contract violation.
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Whether this error reports a degenerate placement frame.
    pub const fn is_degenerate_frame(&self) -> bool {
        matches!(self, Self::DegenerateFrame { .. })
    }
}

/// Errors raised while assembling a link hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("unknown parent link id {0}")]
    UnknownParent(usize),

    #[error("duplicate link name: {0}")]
    DuplicateName(String),

    #[error("unknown link: {0}")]
    UnknownLink(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pincer_error_from_config_error() {
        let err = ConfigError::InvalidValue {
            field: "gripper.initial_jaw_width".into(),
            message: "must be within [0, 85]".into(),
        };
        let pincer_err: PincerError = err.into();
        assert!(matches!(pincer_err, PincerError::Config(_)));
        assert!(pincer_err.to_string().contains("initial_jaw_width"));
    }

    #[test]
    fn pincer_error_from_kinematics_error() {
        let err = KinematicsError::DegenerateFrame { cross_norm: 0.0 };
        let pincer_err: PincerError = err.into();
        assert!(matches!(pincer_err, PincerError::Kinematics(_)));
        assert!(pincer_err.to_string().contains("Degenerate"));
    }

    #[test]
    fn argument_error_lifts_into_invalid_argument() {
        let err: KinematicsError = ArgumentError::NonFiniteJawWidth.into();
        assert!(err.is_invalid_argument());
        assert!(!err.is_degenerate_frame());
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn kinematics_error_is_copy() {
        let err = KinematicsError::DegenerateFrame { cross_norm: 1e-9 };
        let err2 = err;
        assert_eq!(err, err2);
    }

    #[test]
    fn argument_error_display_messages() {
        assert_eq!(
            ArgumentError::JawWidthOutOfRange {
                width: 86.0,
                min: 0.0,
                max: 85.0
            }
            .to_string(),
            "jaw width 86 outside [0, 85]"
        );
        assert_eq!(
            ArgumentError::NonOrthogonal { dot: 0.5 }.to_string(),
            "y and z directions are not orthogonal (y.z = 0.5)"
        );
        assert_eq!(
            ArgumentError::NotUnitLength { axis: 'y', norm: 2.0 }.to_string(),
            "y direction is not unit length (|y| = 2)"
        );
        assert_eq!(
            ArgumentError::NonFiniteVector { what: "position" }.to_string(),
            "position contains NaN or Inf"
        );
    }

    #[test]
    fn hierarchy_error_display_messages() {
        assert_eq!(
            HierarchyError::UnknownParent(7).to_string(),
            "unknown parent link id 7"
        );
        assert_eq!(
            HierarchyError::DuplicateName("base".into()).to_string(),
            "duplicate link name: base"
        );
        assert_eq!(
            HierarchyError::UnknownLink("thumb".into()).to_string(),
            "unknown link: thumb"
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn errors_are_send_sync() {
        assert_send_sync::<PincerError>();
        assert_send_sync::<KinematicsError>();
    }
}
