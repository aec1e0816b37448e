//! Bevy entity spawning from a [`LinkageModel`].
//!
//! Creates a holder entity for the placement and one child entity per link,
//! nested the same way as the link tree.

use std::collections::HashMap;

use bevy::prelude::*;
use nalgebra::{Isometry3, Matrix4};

use pincer_linkage::LinkageModel;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Component storing the link name on a link entity.
#[derive(Component, Clone, Debug)]
pub struct LinkName(pub String);

/// Marker for the holder entity that receives the placement transform.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct GripperRoot;

// ---------------------------------------------------------------------------
// SpawnedGripper
// ---------------------------------------------------------------------------

/// Result of spawning a gripper: the holder plus link name to entity.
#[derive(Debug, Clone)]
pub struct SpawnedGripper {
    /// Name given to the holder entity.
    pub name: String,
    /// Holder entity, parent of the base link.
    pub root: Entity,
    /// Map from link name to the spawned entity.
    pub links: HashMap<String, Entity>,
}

impl SpawnedGripper {
    /// Get the entity for a link by name.
    pub fn link_entity(&self, name: &str) -> Option<Entity> {
        self.links.get(name).copied()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

// ---------------------------------------------------------------------------
// spawn_gripper
// ---------------------------------------------------------------------------

/// Spawn the holder and link entities for `model`.
///
/// Each link entity gets [`Name`], [`LinkName`] and a [`Transform`] set from
/// the link's current local pose. The holder gets [`GripperRoot`] and an
/// identity transform.
pub fn spawn_gripper(world: &mut World, model: &LinkageModel, name: &str) -> SpawnedGripper {
    let root = world
        .spawn((Name::new(name.to_owned()), GripperRoot, Transform::IDENTITY))
        .id();

    let tree = model.hierarchy();
    let mut entities: Vec<Entity> = Vec::with_capacity(tree.len());
    let mut links = HashMap::with_capacity(tree.len());

    for (_, link) in tree.iter() {
        let entity = world
            .spawn((
                Name::new(link.name().to_owned()),
                LinkName(link.name().to_owned()),
                isometry_to_transform(&link.local_pose()),
            ))
            .id();
        // Arena order guarantees the parent entity already exists.
        let parent = link.parent().map_or(root, |p| entities[p.index()]);
        world.entity_mut(parent).add_child(entity);
        entities.push(entity);
        links.insert(link.name().to_owned(), entity);
    }

    SpawnedGripper {
        name: name.to_owned(),
        root,
        links,
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// nalgebra isometry to a unit-scale Bevy transform.
pub fn isometry_to_transform(pose: &Isometry3<f32>) -> Transform {
    let t = pose.translation.vector;
    let q = pose.rotation;
    Transform {
        translation: Vec3::new(t.x, t.y, t.z),
        rotation: Quat::from_xyzw(q.i, q.j, q.k, q.w),
        scale: Vec3::ONE,
    }
}

/// Column-major nalgebra matrix to a Bevy transform.
pub fn matrix_to_transform(m: &Matrix4<f32>) -> Transform {
    Transform::from_matrix(Mat4::from_cols_slice(m.as_slice()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
