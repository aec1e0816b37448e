//! Linkage kinematics for a Robotiq-85 style parallel-jaw gripper.
//!
//! Holds the hand's link tree (base, outer and inner knuckles, fingers,
//! fingertips) and turns a jaw width into the heading of every driven link.
//!
//! # Architecture
//!
//! ```text
//! jaw width ──► GripperState::solve ──► LinkageModel ──► LinkHierarchy ──► LinkPoseSink
//! ```
//!
//! The [`LinkageModel`] owns its [`LinkHierarchy`]. Link handles are resolved
//! once into [`Rtq85Links`], so updates never search the tree by name.

pub mod geometry;
pub mod hierarchy;
pub mod linkage;

pub use geometry::{Rtq85Links, rtq85_hierarchy};
pub use hierarchy::{Hpr, Link, LinkHierarchy, LinkId};
pub use linkage::{GripperState, KnuckleBranch, LinkageModel, knuckle_angle_for};
