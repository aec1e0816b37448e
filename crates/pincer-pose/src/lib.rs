//! Placement of a gripper root in a target frame.
//!
//! A [`PlacementFrame`] gives a position plus the desired local Y and Z axes.
//! [`PoseComposer`] completes the basis with `x = y × z` and returns the 4x4
//! rigid transform that puts the root link there.

pub mod composer;
pub mod frame;

pub use composer::{PoseComposer, compose};
pub use frame::PlacementFrame;
