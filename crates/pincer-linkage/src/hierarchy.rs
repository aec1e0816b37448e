//! Arena-backed kinematic tree of named links.
//!
//! Links live in a flat `Vec` and refer to each other by [`LinkId`]. A link
//! can only be added under a parent that already exists, so parents always
//! precede their children and a single forward pass is enough for forward
//! kinematics.

use std::ops::Index;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use pincer_core::error::HierarchyError;

// ---------------------------------------------------------------------------
// Hpr
// ---------------------------------------------------------------------------

/// Heading / pitch / roll in degrees.
///
/// Heading rotates about +Z, pitch about +X, roll about +Y. The composed
/// rotation is `Rz(heading) * Rx(pitch) * Ry(roll)`, so roll is applied
/// first and heading last.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hpr {
    pub heading: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Hpr {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(heading: f32, pitch: f32, roll: f32) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }

    /// Same pitch and roll, heading replaced.
    #[must_use]
    pub const fn with_heading(self, heading: f32) -> Self {
        Self { heading, ..self }
    }

    pub fn to_rotation(self) -> UnitQuaternion<f32> {
        let h = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.heading.to_radians());
        let p = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians());
        let r = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.roll.to_radians());
        h * p * r
    }
}

impl From<[f32; 3]> for Hpr {
    fn from([heading, pitch, roll]: [f32; 3]) -> Self {
        Self::new(heading, pitch, roll)
    }
}

// ---------------------------------------------------------------------------
// LinkId / Link
// ---------------------------------------------------------------------------

/// Stable handle to a link inside one [`LinkHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(usize);

impl LinkId {
    /// Position of the link in the arena.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A rigid link and its fixed attachment to its parent.
#[derive(Debug, Clone)]
pub struct Link {
    name: String,
    parent: Option<LinkId>,
    children: Vec<LinkId>,
    offset: Vector3<f32>,
    base_orientation: Hpr,
    orientation: Hpr,
}

impl Link {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` only for the root.
    pub const fn parent(&self) -> Option<LinkId> {
        self.parent
    }

    pub fn children(&self) -> &[LinkId] {
        &self.children
    }

    /// Translation relative to the parent frame.
    pub const fn offset(&self) -> &Vector3<f32> {
        &self.offset
    }

    /// Orientation set at construction.
    pub const fn base_orientation(&self) -> Hpr {
        self.base_orientation
    }

    /// Current orientation relative to the parent frame.
    pub const fn orientation(&self) -> Hpr {
        self.orientation
    }

    /// Local transform: translate by the offset, then rotate.
    pub fn local_pose(&self) -> Isometry3<f32> {
        Isometry3::from_parts(
            Translation3::from(self.offset),
            self.orientation.to_rotation(),
        )
    }
}

// ---------------------------------------------------------------------------
// LinkHierarchy
// ---------------------------------------------------------------------------

/// A tree of links rooted at index 0.
#[derive(Debug, Clone)]
pub struct LinkHierarchy {
    links: Vec<Link>,
}

impl LinkHierarchy {
    /// Create a hierarchy holding only a root link at the origin.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            links: vec![Link {
                name: root_name.into(),
                parent: None,
                children: Vec::new(),
                offset: Vector3::zeros(),
                base_orientation: Hpr::ZERO,
                orientation: Hpr::ZERO,
            }],
        }
    }

    /// Attach a new link under `parent`.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::UnknownParent`] if `parent` does not belong to this
    /// hierarchy, [`HierarchyError::DuplicateName`] if `name` is taken.
    pub fn add_link(
        &mut self,
        name: impl Into<String>,
        parent: LinkId,
        offset: Vector3<f32>,
        orientation: Hpr,
    ) -> Result<LinkId, HierarchyError> {
        let name = name.into();
        if parent.0 >= self.links.len() {
            return Err(HierarchyError::UnknownParent(parent.0));
        }
        if self.find(&name).is_some() {
            return Err(HierarchyError::DuplicateName(name));
        }

        let id = LinkId(self.links.len());
        self.links.push(Link {
            name,
            parent: Some(parent),
            children: Vec::new(),
            offset,
            base_orientation: orientation,
            orientation,
        });
        self.links[parent.0].children.push(id);
        Ok(id)
    }

    pub const fn root(&self) -> LinkId {
        LinkId(0)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always false: the root exists from construction.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    /// Look up a link handle by name.
    pub fn find(&self, name: &str) -> Option<LinkId> {
        self.links.iter().position(|l| l.name == name).map(LinkId)
    }

    /// Like [`find`](Self::find), but as an error for `?` chains.
    pub fn require(&self, name: &str) -> Result<LinkId, HierarchyError> {
        self.find(name)
            .ok_or_else(|| HierarchyError::UnknownLink(name.to_owned()))
    }

    /// Links in arena order (parents before children).
    pub fn iter(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links.iter().enumerate().map(|(i, l)| (LinkId(i), l))
    }

    /// Set the heading of `id`, keeping the pitch and roll it was built with.
    pub(crate) fn set_heading(&mut self, id: LinkId, heading: f32) {
        let link = &mut self.links[id.0];
        link.orientation = link.base_orientation.with_heading(heading);
    }

    pub fn local_pose(&self, id: LinkId) -> Isometry3<f32> {
        self[id].local_pose()
    }

    /// Pose of `id` in the root frame.
    pub fn world_pose(&self, id: LinkId) -> Isometry3<f32> {
        let mut pose = self.local_pose(id);
        let mut current = self[id].parent;
        while let Some(parent) = current {
            pose = self.local_pose(parent) * pose;
            current = self[parent].parent;
        }
        pose
    }

    /// Poses of every link, indexed by [`LinkId::index`], with the root
    /// placed at `root_transform`.
    pub fn world_poses(&self, root_transform: &Isometry3<f32>) -> Vec<Isometry3<f32>> {
        let mut poses: Vec<Isometry3<f32>> = Vec::with_capacity(self.links.len());
        for link in &self.links {
            let parent_pose = link.parent.map_or(*root_transform, |p| poses[p.0]);
            poses.push(parent_pose * link.local_pose());
        }
        poses
    }
}

impl Index<LinkId> for LinkHierarchy {
    type Output = Link;

    fn index(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_link_arm() -> (LinkHierarchy, LinkId, LinkId) {
        let mut tree = LinkHierarchy::new("base");
        let root = tree.root();
        let upper = tree
            .add_link("upper", root, Vector3::new(0.0, 1.0, 0.0), Hpr::ZERO)
            .unwrap();
        let lower = tree
            .add_link("lower", upper, Vector3::new(0.0, 2.0, 0.0), Hpr::ZERO)
            .unwrap();
        (tree, upper, lower)
    }

    #[test]
    fn hpr_zero_is_identity() {
        let q = Hpr::ZERO.to_rotation();
        assert_relative_eq!(q.angle(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn heading_rotates_about_z() {
        let q = Hpr::new(90.0, 0.0, 0.0).to_rotation();
        let v = q * Vector3::x();
        assert_relative_eq!(v, Vector3::y(), epsilon = 1e-6);
    }

    #[test]
    fn roll_180_mirrors_x_and_z() {
        let q = Hpr::new(0.0, 0.0, 180.0).to_rotation();
        assert_relative_eq!(q * Vector3::x(), -Vector3::x(), epsilon = 1e-6);
        assert_relative_eq!(q * Vector3::y(), Vector3::y(), epsilon = 1e-6);
        assert_relative_eq!(q * Vector3::z(), -Vector3::z(), epsilon = 1e-6);
    }

    #[test]
    fn roll_applies_before_heading() {
        // Roll first maps +X to -X, then heading 90 maps -X to -Y.
        let q = Hpr::new(90.0, 0.0, 180.0).to_rotation();
        assert_relative_eq!(q * Vector3::x(), -Vector3::y(), epsilon = 1e-6);
    }

    #[test]
    fn add_link_records_parent_and_children() {
        let (tree, upper, lower) = two_link_arm();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree[upper].parent(), Some(tree.root()));
        assert_eq!(tree[upper].children(), &[lower]);
        assert_eq!(tree[tree.root()].parent(), None);
    }

    #[test]
    fn add_link_rejects_duplicate_name() {
        let (mut tree, upper, _) = two_link_arm();
        let err = tree
            .add_link("lower", upper, Vector3::zeros(), Hpr::ZERO)
            .unwrap_err();
        assert_eq!(err, HierarchyError::DuplicateName("lower".into()));
    }

    #[test]
    fn add_link_rejects_foreign_parent() {
        let mut tree = LinkHierarchy::new("base");
        let (other, _, lower) = two_link_arm();
        assert_eq!(other.len(), 3);
        let err = tree
            .add_link("x", lower, Vector3::zeros(), Hpr::ZERO)
            .unwrap_err();
        assert_eq!(err, HierarchyError::UnknownParent(2));
    }

    #[test]
    fn find_and_require() {
        let (tree, upper, _) = two_link_arm();
        assert_eq!(tree.find("upper"), Some(upper));
        assert_eq!(tree.find("missing"), None);
        assert_eq!(
            tree.require("missing").unwrap_err(),
            HierarchyError::UnknownLink("missing".into())
        );
    }

    #[test]
    fn world_pose_accumulates_offsets() {
        let (tree, _, lower) = two_link_arm();
        let pose = tree.world_pose(lower);
        assert_relative_eq!(pose.translation.vector, Vector3::new(0.0, 3.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn world_pose_follows_parent_heading() {
        let (mut tree, upper, lower) = two_link_arm();
        tree.set_heading(upper, -90.0);
        // Upper sits at (0,1,0); its heading swings the lower offset from +Y to +X.
        let pose = tree.world_pose(lower);
        assert_relative_eq!(pose.translation.vector, Vector3::new(2.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn world_poses_match_world_pose() {
        let (mut tree, upper, _) = two_link_arm();
        tree.set_heading(upper, 30.0);
        let poses = tree.world_poses(&Isometry3::identity());
        for (id, _) in tree.iter() {
            assert_relative_eq!(poses[id.index()], tree.world_pose(id), epsilon = 1e-5);
        }
    }

    #[test]
    fn world_poses_apply_root_transform() {
        let (tree, _, lower) = two_link_arm();
        let root = Isometry3::translation(10.0, 0.0, 0.0);
        let poses = tree.world_poses(&root);
        assert_relative_eq!(
            poses[lower.index()].translation.vector,
            Vector3::new(10.0, 3.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn set_heading_keeps_pitch_and_roll() {
        let mut tree = LinkHierarchy::new("base");
        let root = tree.root();
        let id = tree
            .add_link("mirrored", root, Vector3::zeros(), Hpr::new(0.0, 10.0, 180.0))
            .unwrap();
        tree.set_heading(id, 25.0);
        assert_eq!(tree[id].orientation(), Hpr::new(25.0, 10.0, 180.0));
        assert_eq!(tree[id].base_orientation(), Hpr::new(0.0, 10.0, 180.0));
    }
}
