//! Bevy plugin that keeps gripper link transforms in sync with their models.
//!
//! Provides [`PincerPlugin`], which registers [`GripperMap`] and runs
//! [`sync_gripper_transforms`] every frame. Only grippers whose jaw width or
//! placement changed since the last sync are written.

use std::collections::HashMap;

use bevy::prelude::*;
use nalgebra::{Isometry3, Matrix4};
use tracing::warn;

use pincer_core::error::KinematicsError;
use pincer_core::traits::{LinkPoseSink, RootPlacementSink};
use pincer_core::types::GripperId;
use pincer_linkage::LinkageModel;
use pincer_pose::{PlacementFrame, PoseComposer};

use crate::spawner::{SpawnedGripper, isometry_to_transform, matrix_to_transform};

/// Bevy plugin that adds gripper transform syncing each frame.
pub struct PincerPlugin;

impl Plugin for PincerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GripperMap>()
            .init_resource::<PlacementComposer>()
            .add_systems(Update, sync_gripper_transforms);
    }
}

/// Resource holding the composer used by [`GripperMap::set_placement`].
#[derive(Resource, Debug, Clone, Default)]
pub struct PlacementComposer(pub PoseComposer);

// ---------------------------------------------------------------------------
// GripperMap
// ---------------------------------------------------------------------------

/// One gripper: its model, its entities and its pending placement.
#[derive(Debug)]
pub struct GripperEntry {
    model: LinkageModel,
    spawned: SpawnedGripper,
    placement: Option<Matrix4<f32>>,
    dirty: bool,
}

impl GripperEntry {
    pub const fn model(&self) -> &LinkageModel {
        &self.model
    }

    pub const fn spawned(&self) -> &SpawnedGripper {
        &self.spawned
    }

    /// Last accepted placement, if any.
    pub const fn placement(&self) -> Option<&Matrix4<f32>> {
        self.placement.as_ref()
    }

    /// Whether the next sync will write this gripper.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Resource mapping [`GripperId`] to gripper data.
///
/// Each [`LinkageModel`] is owned here; systems and callers reach it by id.
#[derive(Resource, Debug, Default)]
pub struct GripperMap {
    grippers: HashMap<GripperId, GripperEntry>,
}

impl GripperMap {
    /// Register a spawned gripper. Its current pose is written on the next sync.
    pub fn insert(&mut self, id: GripperId, model: LinkageModel, spawned: SpawnedGripper) {
        self.grippers.insert(
            id,
            GripperEntry {
                model,
                spawned,
                placement: None,
                dirty: true,
            },
        );
    }

    pub fn remove(&mut self, id: GripperId) -> Option<GripperEntry> {
        self.grippers.remove(&id)
    }

    pub fn get(&self, id: GripperId) -> Option<&GripperEntry> {
        self.grippers.get(&id)
    }

    pub fn len(&self) -> usize {
        self.grippers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grippers.is_empty()
    }

    /// Set the jaw width of a gripper.
    ///
    /// Returns `Ok(false)` if `id` is not registered.
    ///
    /// # Errors
    ///
    /// Propagates [`LinkageModel::set_jaw_width`] errors; the gripper is left
    /// unchanged.
    pub fn set_jaw_width(&mut self, id: GripperId, width: f32) -> Result<bool, KinematicsError> {
        let Some(entry) = self.grippers.get_mut(&id) else {
            return Ok(false);
        };
        entry.model.set_jaw_width(width)?;
        entry.dirty = true;
        Ok(true)
    }

    /// Compose and store the placement of a gripper's holder entity.
    ///
    /// Returns `Ok(false)` if `id` is not registered.
    ///
    /// # Errors
    ///
    /// Propagates [`PoseComposer::compose_frame`] errors; the previous
    /// placement is kept.
    pub fn set_placement(
        &mut self,
        id: GripperId,
        composer: &PoseComposer,
        frame: &PlacementFrame,
    ) -> Result<bool, KinematicsError> {
        let Some(entry) = self.grippers.get_mut(&id) else {
            return Ok(false);
        };
        entry.placement = Some(composer.compose_frame(frame)?);
        entry.dirty = true;
        Ok(true)
    }

    /// Drop the placement; the holder goes back to identity on the next sync.
    pub fn clear_placement(&mut self, id: GripperId) {
        if let Some(entry) = self.grippers.get_mut(&id) {
            entry.placement = None;
            entry.dirty = true;
        }
    }
}

// ---------------------------------------------------------------------------
// TransformWriter
// ---------------------------------------------------------------------------

/// Writes link poses and the root placement into entity [`Transform`]s.
pub struct TransformWriter<'a, 'w, 's, 'q> {
    spawned: &'a SpawnedGripper,
    transforms: &'a mut Query<'w, 's, &'q mut Transform>,
}

impl<'a, 'w, 's, 'q> TransformWriter<'a, 'w, 's, 'q> {
    pub fn new(
        spawned: &'a SpawnedGripper,
        transforms: &'a mut Query<'w, 's, &'q mut Transform>,
    ) -> Self {
        Self {
            spawned,
            transforms,
        }
    }

    fn write(&mut self, entity: Entity, value: Transform) {
        match self.transforms.get_mut(entity) {
            Ok(mut transform) => *transform = value,
            Err(_) => warn!(
                ?entity,
                gripper = %self.spawned.name,
                "gripper entity has no Transform"
            ),
        }
    }
}

impl LinkPoseSink for TransformWriter<'_, '_, '_, '_> {
    fn set_local_pose(&mut self, name: &str, pose: &Isometry3<f32>) {
        let Some(entity) = self.spawned.link_entity(name) else {
            warn!(link = name, gripper = %self.spawned.name, "no entity for link");
            return;
        };
        self.write(entity, isometry_to_transform(pose));
    }
}

impl RootPlacementSink for TransformWriter<'_, '_, '_, '_> {
    fn set_root_transform(&mut self, name: &str, transform: &Matrix4<f32>) {
        if name != self.spawned.name {
            warn!(root = name, gripper = %self.spawned.name, "placement for unknown root");
            return;
        }
        self.write(self.spawned.root, matrix_to_transform(transform));
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Writes link and holder transforms for every dirty gripper.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_gripper_transforms(
    mut grippers: ResMut<GripperMap>,
    mut transforms: Query<&mut Transform>,
) {
    for entry in grippers.grippers.values_mut() {
        if !entry.dirty {
            continue;
        }

        let mut writer = TransformWriter::new(&entry.spawned, &mut transforms);
        entry.model.publish(&mut writer);
        let placement = entry.placement.unwrap_or_else(Matrix4::identity);
        writer.set_root_transform(&entry.spawned.name, &placement);

        entry.dirty = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
