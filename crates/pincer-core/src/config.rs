use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{JAW_WIDTH_MAX, JAW_WIDTH_MIN};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_initial_jaw_width() -> f32 {
    JAW_WIDTH_MAX
}
const fn default_orthogonality_tolerance() -> f32 {
    1e-4
}
const fn default_unit_tolerance() -> f32 {
    1e-4
}
const fn default_degenerate_epsilon() -> f32 {
    1e-6
}

// ---------------------------------------------------------------------------
// PincerConfig
// ---------------------------------------------------------------------------

/// Top-level configuration, usually loaded from a TOML file.
///
/// ```toml
/// [gripper]
/// initial_jaw_width = 40.0
///
/// [placement]
/// policy = "orthogonalize"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PincerConfig {
    #[serde(default)]
    pub gripper: GripperConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
}

impl PincerConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gripper.validate()?;
        self.placement.validate()
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// GripperConfig
// ---------------------------------------------------------------------------

/// Per-instance gripper settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GripperConfig {
    /// Jaw width applied at construction (default: 85, fully open).
    #[serde(default = "default_initial_jaw_width")]
    pub initial_jaw_width: f32,
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            initial_jaw_width: default_initial_jaw_width(),
        }
    }
}

impl GripperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = self.initial_jaw_width;
        if !w.is_finite() || !(JAW_WIDTH_MIN..=JAW_WIDTH_MAX).contains(&w) {
            return Err(ConfigError::InvalidValue {
                field: "gripper.initial_jaw_width".into(),
                message: format!("{w} must be within [{JAW_WIDTH_MIN}, {JAW_WIDTH_MAX}]"),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FramePolicy / PlacementConfig
// ---------------------------------------------------------------------------

/// How the placement composer treats direction vectors that are not
/// an orthonormal pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePolicy {
    /// Reject non-orthogonal or non-unit directions.
    #[default]
    Validate,
    /// Normalise y, then Gram-Schmidt z against y.
    Orthogonalize,
}

/// Tolerances used when composing a placement transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    #[serde(default)]
    pub policy: FramePolicy,

    /// Maximum accepted `|y . z|` under [`FramePolicy::Validate`].
    #[serde(default = "default_orthogonality_tolerance")]
    pub orthogonality_tolerance: f32,

    /// Maximum accepted `||v| - 1|` under [`FramePolicy::Validate`].
    #[serde(default = "default_unit_tolerance")]
    pub unit_tolerance: f32,

    /// Sine of the angle between y and z at or below which the frame is
    /// degenerate.
    #[serde(default = "default_degenerate_epsilon")]
    pub degenerate_epsilon: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            policy: FramePolicy::default(),
            orthogonality_tolerance: default_orthogonality_tolerance(),
            unit_tolerance: default_unit_tolerance(),
            degenerate_epsilon: default_degenerate_epsilon(),
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("placement.orthogonality_tolerance", self.orthogonality_tolerance),
            ("placement.unit_tolerance", self.unit_tolerance),
            ("placement.degenerate_epsilon", self.degenerate_epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: format!("{value} must be finite and >= 0"),
                });
            }
        }
        Ok(())
    }

    /// Builder-style policy override.
    #[must_use]
    pub const fn with_policy(mut self, policy: FramePolicy) -> Self {
        self.policy = policy;
        self
    }
}
