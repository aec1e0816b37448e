//! Fixed geometry of the Robotiq-85 hand.
//!
//! The hand is a parallelogram (1.905-1.905; 5.715-5.715) plus a fixed
//! triangle formed by the finger (4.75), the inner knuckle (5.715) and the
//! outer knuckle (3.175). Link offsets are in the mesh unit; jaw width is in
//! millimetres.

use nalgebra::Vector3;

use pincer_core::error::HierarchyError;
pub use pincer_core::types::{JAW_WIDTH_MAX, JAW_WIDTH_MIN};

use crate::hierarchy::{Hpr, LinkHierarchy, LinkId};

/// Length of the knuckle link in the closed-form triangle.
pub const KNUCKLE_LINK_LENGTH: f32 = 57.15;

/// Half-width at which the fingertip contact passes over the knuckle pivot.
pub const FINGERTIP_CONTACT_OFFSET: f32 = 5.0;

/// Knuckle heading (degrees) when the half-width equals the contact offset.
pub const KNUCKLE_REST_ANGLE_DEG: f32 = 41.0;

// ---------------------------------------------------------------------------
// Link table
// ---------------------------------------------------------------------------

/// Static description of one link of the hand.
#[derive(Debug, Clone, Copy)]
pub struct LinkDesc {
    pub name: &'static str,
    /// `None` for the base.
    pub parent: Option<&'static str>,
    pub offset: [f32; 3],
    /// Heading, pitch, roll in degrees.
    pub hpr: [f32; 3],
}

pub const BASE: &str = "base";
pub const LEFT_OUTER_KNUCKLE: &str = "left_outer_knuckle";
pub const RIGHT_OUTER_KNUCKLE: &str = "right_outer_knuckle";
pub const LEFT_FINGER: &str = "left_finger";
pub const RIGHT_FINGER: &str = "right_finger";
pub const LEFT_INNER_KNUCKLE: &str = "left_inner_knuckle";
pub const RIGHT_INNER_KNUCKLE: &str = "right_inner_knuckle";
pub const LEFT_FINGERTIP: &str = "left_fingertip";
pub const RIGHT_FINGERTIP: &str = "right_fingertip";

/// Every link of the hand, parents listed before children.
///
/// Left-side knuckles carry a 180 degree roll so the left half is the mirror
/// image of the right half.
pub const RTQ85_LINKS: [LinkDesc; 9] = [
    LinkDesc {
        name: BASE,
        parent: None,
        offset: [0.0, 0.0, 0.0],
        hpr: [0.0, 0.0, 0.0],
    },
    LinkDesc {
        name: LEFT_OUTER_KNUCKLE,
        parent: Some(BASE),
        offset: [-3.060_114_4, 5.490_451_6, 0.0],
        hpr: [0.0, 0.0, 180.0],
    },
    LinkDesc {
        name: RIGHT_OUTER_KNUCKLE,
        parent: Some(BASE),
        offset: [3.060_114_4, 5.490_451_6, 0.0],
        hpr: [0.0, 0.0, 0.0],
    },
    LinkDesc {
        name: LEFT_FINGER,
        parent: Some(LEFT_OUTER_KNUCKLE),
        offset: [3.148_504_4, -0.408_552_46, 0.0],
        hpr: [0.0, 0.0, 0.0],
    },
    LinkDesc {
        name: RIGHT_FINGER,
        parent: Some(RIGHT_OUTER_KNUCKLE),
        offset: [3.148_504_4, -0.408_552_46, 0.0],
        hpr: [0.0, 0.0, 0.0],
    },
    LinkDesc {
        name: LEFT_INNER_KNUCKLE,
        parent: Some(BASE),
        offset: [-1.27, 6.142, 0.0],
        hpr: [0.0, 0.0, 180.0],
    },
    LinkDesc {
        name: RIGHT_INNER_KNUCKLE,
        parent: Some(BASE),
        offset: [1.27, 6.142, 0.0],
        hpr: [0.0, 0.0, 0.0],
    },
    LinkDesc {
        name: LEFT_FINGERTIP,
        parent: Some(LEFT_INNER_KNUCKLE),
        offset: [3.759_940_8, 4.303_959_8, 0.0],
        hpr: [0.0, 0.0, 0.0],
    },
    LinkDesc {
        name: RIGHT_FINGERTIP,
        parent: Some(RIGHT_INNER_KNUCKLE),
        offset: [3.759_940_8, 4.303_959_8, 0.0],
        hpr: [0.0, 0.0, 0.0],
    },
];

// ---------------------------------------------------------------------------
// Rtq85Links
// ---------------------------------------------------------------------------

/// Handles of every link of the hand, resolved once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rtq85Links {
    pub base: LinkId,
    pub left_outer_knuckle: LinkId,
    pub right_outer_knuckle: LinkId,
    pub left_finger: LinkId,
    pub right_finger: LinkId,
    pub left_inner_knuckle: LinkId,
    pub right_inner_knuckle: LinkId,
    pub left_fingertip: LinkId,
    pub right_fingertip: LinkId,
}

impl Rtq85Links {
    /// Resolve every handle by name.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::UnknownLink`] if any link of the hand is missing.
    pub fn resolve(tree: &LinkHierarchy) -> Result<Self, HierarchyError> {
        Ok(Self {
            base: tree.require(BASE)?,
            left_outer_knuckle: tree.require(LEFT_OUTER_KNUCKLE)?,
            right_outer_knuckle: tree.require(RIGHT_OUTER_KNUCKLE)?,
            left_finger: tree.require(LEFT_FINGER)?,
            right_finger: tree.require(RIGHT_FINGER)?,
            left_inner_knuckle: tree.require(LEFT_INNER_KNUCKLE)?,
            right_inner_knuckle: tree.require(RIGHT_INNER_KNUCKLE)?,
            left_fingertip: tree.require(LEFT_FINGERTIP)?,
            right_fingertip: tree.require(RIGHT_FINGERTIP)?,
        })
    }

    /// Links driven by the knuckle angle, paired with the sign of the
    /// heading each one receives.
    pub const fn driven(&self) -> [(LinkId, f32); 6] {
        [
            (self.right_outer_knuckle, 1.0),
            (self.right_inner_knuckle, 1.0),
            (self.right_fingertip, -1.0),
            (self.left_outer_knuckle, -1.0),
            (self.left_inner_knuckle, -1.0),
            (self.left_fingertip, -1.0),
        ]
    }
}

/// Build the hand's link tree from [`RTQ85_LINKS`].
///
/// # Errors
///
/// Propagates [`HierarchyError`] if the table is malformed.
pub fn rtq85_hierarchy() -> Result<(LinkHierarchy, Rtq85Links), HierarchyError> {
    let table = RTQ85_LINKS;
    let (root, rest) = table
        .split_first()
        .ok_or_else(|| HierarchyError::UnknownLink(BASE.into()))?;
    let mut tree = LinkHierarchy::new(root.name);

    for desc in rest {
        let parent_name = desc.parent.unwrap_or(BASE);
        let parent = tree.require(parent_name)?;
        tree.add_link(
            desc.name,
            parent,
            Vector3::from(desc.offset),
            Hpr::from(desc.hpr),
        )?;
    }

    let links = Rtq85Links::resolve(&tree)?;
    Ok((tree, links))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
