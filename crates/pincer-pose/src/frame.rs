//! Target frame for placing an assembly.

use nalgebra::Vector3;

/// Position and two orthogonal unit directions.
///
/// Built fresh for each placement and consumed by
/// [`PoseComposer`](crate::PoseComposer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementFrame {
    pub position: Vector3<f32>,
    /// Where the assembly's local +Y should point.
    pub y_direction: Vector3<f32>,
    /// Where the assembly's local +Z should point.
    pub z_direction: Vector3<f32>,
}

impl Default for PlacementFrame {
    /// At the origin, axes aligned with the parent frame.
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            y_direction: Vector3::y(),
            z_direction: Vector3::z(),
        }
    }
}

impl PlacementFrame {
    pub const fn new(
        position: Vector3<f32>,
        y_direction: Vector3<f32>,
        z_direction: Vector3<f32>,
    ) -> Self {
        Self {
            position,
            y_direction,
            z_direction,
        }
    }

    pub fn from_arrays(position: [f32; 3], y_direction: [f32; 3], z_direction: [f32; 3]) -> Self {
        Self::new(
            Vector3::from(position),
            Vector3::from(y_direction),
            Vector3::from(z_direction),
        )
    }

    /// Same axes, different position.
    #[must_use]
    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    /// `y × z`, unnormalised.
    pub fn x_direction(&self) -> Vector3<f32> {
        self.y_direction.cross(&self.z_direction)
    }
}
