//! Orthonormal placement matrices from two direction vectors.
//!
//! The composer completes a right-handed basis from the Y and Z directions
//! of a [`PlacementFrame`] and writes it, together with the position, into
//! a homogeneous 4x4 matrix:
//!
//! ```text
//! | x.x  y.x  z.x  p.x |
//! | x.y  y.y  z.y  p.y |
//! | x.z  y.z  z.z  p.z |
//! |  0    0    0    1  |
//! ```

use nalgebra::{Isometry3, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};
use tracing::debug;

use pincer_core::config::{FramePolicy, PlacementConfig};
use pincer_core::error::{ArgumentError, ConfigError, KinematicsError};
use pincer_core::traits::RootPlacementSink;

use crate::frame::PlacementFrame;

/// Orthonormal basis resolved from a frame, columns of the rotation block.
struct Basis {
    x: Vector3<f32>,
    y: Vector3<f32>,
    z: Vector3<f32>,
}

// ---------------------------------------------------------------------------
// PoseComposer
// ---------------------------------------------------------------------------

/// Builds rigid placement transforms under a [`PlacementConfig`].
#[derive(Debug, Clone, Default)]
pub struct PoseComposer {
    config: PlacementConfig,
}

impl PoseComposer {
    /// Composer for `config`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if a tolerance is negative or not finite.
    pub fn new(config: PlacementConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Composer that re-orthogonalises instead of rejecting skewed input.
    pub fn orthogonalizing() -> Self {
        Self {
            config: PlacementConfig::default().with_policy(FramePolicy::Orthogonalize),
        }
    }

    pub const fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Place a root at `position` with local Y along `y_direction` and local
    /// Z along `z_direction`.
    ///
    /// # Errors
    ///
    /// - [`KinematicsError::DegenerateFrame`] if the directions are parallel
    ///   or either is zero.
    /// - [`KinematicsError::InvalidArgument`] for non-finite input, or, under
    ///   [`FramePolicy::Validate`], directions that are not orthogonal or not
    ///   unit length.
    pub fn compose(
        &self,
        position: &Vector3<f32>,
        y_direction: &Vector3<f32>,
        z_direction: &Vector3<f32>,
    ) -> Result<Matrix4<f32>, KinematicsError> {
        self.compose_frame(&PlacementFrame::new(*position, *y_direction, *z_direction))
    }

    /// [`compose`](Self::compose) taking a [`PlacementFrame`].
    ///
    /// # Errors
    ///
    /// See [`compose`](Self::compose).
    pub fn compose_frame(&self, frame: &PlacementFrame) -> Result<Matrix4<f32>, KinematicsError> {
        let Basis { x, y, z } = self.resolve_basis(frame)?;
        Ok(Matrix4::from_columns(&[
            x.push(0.0),
            y.push(0.0),
            z.push(0.0),
            frame.position.push(1.0),
        ]))
    }

    /// The same placement as an [`Isometry3`], for forward kinematics.
    ///
    /// # Errors
    ///
    /// See [`compose`](Self::compose).
    pub fn compose_isometry(
        &self,
        frame: &PlacementFrame,
    ) -> Result<Isometry3<f32>, KinematicsError> {
        let Basis { x, y, z } = self.resolve_basis(frame)?;
        let rotation = Rotation3::from_basis_unchecked(&[x, y, z]);
        Ok(Isometry3::from_parts(
            Translation3::from(frame.position),
            UnitQuaternion::from_rotation_matrix(&rotation),
        ))
    }

    /// Placement relative to a parent node already at `parent` in world space.
    ///
    /// # Errors
    ///
    /// See [`compose`](Self::compose).
    pub fn compose_under(
        &self,
        parent: &Matrix4<f32>,
        frame: &PlacementFrame,
    ) -> Result<Matrix4<f32>, KinematicsError> {
        Ok(parent * self.compose_frame(frame)?)
    }

    /// Compose and hand the result to `sink` as the transform of `root_name`.
    ///
    /// Nothing is sent if composition fails.
    ///
    /// # Errors
    ///
    /// See [`compose`](Self::compose).
    pub fn apply(
        &self,
        sink: &mut impl RootPlacementSink,
        root_name: &str,
        frame: &PlacementFrame,
    ) -> Result<Matrix4<f32>, KinematicsError> {
        let transform = self.compose_frame(frame)?;
        sink.set_root_transform(root_name, &transform);
        Ok(transform)
    }

    fn resolve_basis(&self, frame: &PlacementFrame) -> Result<Basis, KinematicsError> {
        for (what, v) in [
            ("position", &frame.position),
            ("y direction", &frame.y_direction),
            ("z direction", &frame.z_direction),
        ] {
            if !v.iter().all(|c| c.is_finite()) {
                return Err(ArgumentError::NonFiniteVector { what }.into());
            }
        }

        let y = frame.y_direction;
        let z = frame.z_direction;
        let x = frame.x_direction();

        // Sine of the angle between y and z, independent of their lengths.
        let scale = y.norm() * z.norm();
        if scale <= 0.0 {
            return Err(KinematicsError::DegenerateFrame { cross_norm: 0.0 });
        }
        let cross_norm = x.norm() / scale;
        if !cross_norm.is_finite() || cross_norm <= self.config.degenerate_epsilon {
            return Err(KinematicsError::DegenerateFrame { cross_norm });
        }

        match self.config.policy {
            FramePolicy::Validate => {
                let dot = y.dot(&z);
                if dot.abs() > self.config.orthogonality_tolerance {
                    return Err(ArgumentError::NonOrthogonal { dot }.into());
                }
                for (axis, v) in [('y', &y), ('z', &z)] {
                    let norm = v.norm();
                    if (norm - 1.0).abs() > self.config.unit_tolerance {
                        return Err(ArgumentError::NotUnitLength { axis, norm }.into());
                    }
                }
                Ok(Basis { x, y, z })
            }
            FramePolicy::Orthogonalize => {
                let y = y.normalize();
                let z = (z - y * z.dot(&y)).normalize();
                let x = y.cross(&z);
                debug!(?y, ?z, "placement directions re-orthogonalised");
                Ok(Basis { x, y, z })
            }
        }
    }
}

/// Compose with the default, validating configuration.
///
/// # Errors
///
/// See [`PoseComposer::compose`].
pub fn compose(
    position: &Vector3<f32>,
    y_direction: &Vector3<f32>,
    z_direction: &Vector3<f32>,
) -> Result<Matrix4<f32>, KinematicsError> {
    PoseComposer::default().compose(position, y_direction, z_direction)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
