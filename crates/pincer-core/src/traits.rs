//! Interfaces the kinematic core pushes its results through.
//!
//! The scene graph, renderer and physics engine are not part of the core.
//! They receive link poses and root placements through these two traits.

use nalgebra::{Isometry3, Matrix4};

// ---------------------------------------------------------------------------
// LinkPoseSink
// ---------------------------------------------------------------------------

/// Receives the local pose of a named link, relative to its parent link.
pub trait LinkPoseSink {
    /// Set the local translation and rotation of link `name`.
    fn set_local_pose(&mut self, name: &str, pose: &Isometry3<f32>);
}

// ---------------------------------------------------------------------------
// RootPlacementSink
// ---------------------------------------------------------------------------

/// Receives the rigid transform that places a root node in its parent frame.
pub trait RootPlacementSink {
    /// Set the 4x4 transform of root node `name`.
    fn set_root_transform(&mut self, name: &str, transform: &Matrix4<f32>);
}

impl<T: LinkPoseSink + ?Sized> LinkPoseSink for &mut T {
    fn set_local_pose(&mut self, name: &str, pose: &Isometry3<f32>) {
        (**self).set_local_pose(name, pose);
    }
}

impl<T: RootPlacementSink + ?Sized> RootPlacementSink for &mut T {
    fn set_root_transform(&mut self, name: &str, transform: &Matrix4<f32>) {
        (**self).set_root_transform(name, transform);
    }
}
