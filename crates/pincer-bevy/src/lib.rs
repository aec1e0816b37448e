//! Bevy ECS integration for the gripper kinematics.
//!
//! The scene graph is Bevy's entity hierarchy: one entity per link, parented
//! like the link tree, under a holder entity that carries the placement.
//!
//! # Usage
//!
//! 1. Add [`PincerPlugin`] to your app.
//! 2. Spawn a gripper with [`spawn_gripper`].
//! 3. Register it with [`GripperMap::insert`].
//! 4. Drive it with [`GripperMap::set_jaw_width`] and
//!    [`GripperMap::set_placement`]; the next update writes the transforms.

pub mod plugin;
pub mod spawner;

pub use plugin::{
    GripperEntry, GripperMap, PincerPlugin, PlacementComposer, TransformWriter,
    sync_gripper_transforms,
};
pub use spawner::{
    GripperRoot, LinkName, SpawnedGripper, isometry_to_transform, matrix_to_transform,
    spawn_gripper,
};
