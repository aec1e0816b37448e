//! Jaw width to knuckle angle, and propagation onto the link tree.
//!
//! The knuckle angle comes from the law of sines on the 57.15 knuckle link.
//! The fingertip contact point crosses the knuckle pivot at a half-width of
//! 5, and the triangle flips there, so the solution is split into two
//! mirror-image branches instead of one smooth formula.

use nalgebra::{Isometry3, Point3};
use tracing::{debug, trace};

use pincer_core::config::GripperConfig;
use pincer_core::error::{ArgumentError, KinematicsError, PincerError};
use pincer_core::traits::LinkPoseSink;

use crate::geometry::{
    FINGERTIP_CONTACT_OFFSET, JAW_WIDTH_MAX, JAW_WIDTH_MIN, KNUCKLE_LINK_LENGTH,
    KNUCKLE_REST_ANGLE_DEG, Rtq85Links, rtq85_hierarchy,
};
use crate::hierarchy::{LinkHierarchy, LinkId};

// ---------------------------------------------------------------------------
// Knuckle solution
// ---------------------------------------------------------------------------

/// Which side of the fingertip-over-pivot crossover the jaw is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnuckleBranch {
    /// `width / 2 >= 5`: knuckles at or below the rest angle.
    Open,
    /// `width / 2 < 5`: knuckles past the rest angle.
    Closed,
}

/// Jaw width together with the knuckle angle derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GripperState {
    /// Distance between the fingertip contacts, in [0, 85].
    pub jaw_width: f32,
    /// Knuckle heading in degrees.
    pub knuckle_angle: f32,
    pub branch: KnuckleBranch,
}

impl GripperState {
    /// Solve the knuckle angle for `width`.
    ///
    /// # Errors
    ///
    /// [`KinematicsError::InvalidArgument`] if `width` is not finite or is
    /// outside `[0, 85]`.
    pub fn solve(width: f32) -> Result<Self, KinematicsError> {
        if !width.is_finite() {
            return Err(ArgumentError::NonFiniteJawWidth.into());
        }
        if !(JAW_WIDTH_MIN..=JAW_WIDTH_MAX).contains(&width) {
            return Err(ArgumentError::JawWidthOutOfRange {
                width,
                min: JAW_WIDTH_MIN,
                max: JAW_WIDTH_MAX,
            }
            .into());
        }

        let half = width / 2.0;
        let (branch, knuckle_angle) = if half >= FINGERTIP_CONTACT_OFFSET {
            let ratio = (half - FINGERTIP_CONTACT_OFFSET) / KNUCKLE_LINK_LENGTH;
            (KnuckleBranch::Open, KNUCKLE_REST_ANGLE_DEG - asin_degrees(ratio))
        } else {
            let ratio = (FINGERTIP_CONTACT_OFFSET - half) / KNUCKLE_LINK_LENGTH;
            (KnuckleBranch::Closed, KNUCKLE_REST_ANGLE_DEG + asin_degrees(ratio))
        };

        Ok(Self {
            jaw_width: width,
            knuckle_angle,
            branch,
        })
    }
}

/// Knuckle angle in degrees for a jaw width, without touching any model.
///
/// # Errors
///
/// Same as [`GripperState::solve`].
pub fn knuckle_angle_for(width: f32) -> Result<f32, KinematicsError> {
    GripperState::solve(width).map(|s| s.knuckle_angle)
}

/// `asin` in degrees, with the argument clamped to [-1, 1].
///
/// Valid widths keep the ratio well inside the domain; the clamp only
/// absorbs rounding at the edge.
fn asin_degrees(ratio: f32) -> f32 {
    if ratio.abs() > 1.0 {
        trace!(ratio, "asin argument outside [-1, 1], clamping");
    }
    ratio.clamp(-1.0, 1.0).asin().to_degrees()
}

// ---------------------------------------------------------------------------
// LinkageModel
// ---------------------------------------------------------------------------

/// One gripper instance: the link tree and the jaw state that drives it.
///
/// Knuckle and fingertip orientations change only through
/// [`set_jaw_width`](Self::set_jaw_width); the tree is exposed read-only.
#[derive(Debug, Clone)]
pub struct LinkageModel {
    hierarchy: LinkHierarchy,
    links: Rtq85Links,
    state: GripperState,
}

impl LinkageModel {
    /// Build the hand and apply `initial_jaw_width`.
    ///
    /// # Errors
    ///
    /// [`PincerError::Kinematics`] if the width is out of range.
    pub fn new(initial_jaw_width: f32) -> Result<Self, PincerError> {
        let (hierarchy, links) = rtq85_hierarchy()?;
        let state = GripperState::solve(initial_jaw_width)?;
        let mut model = Self {
            hierarchy,
            links,
            state,
        };
        model.apply(state);
        Ok(model)
    }

    /// Fully open hand.
    ///
    /// # Errors
    ///
    /// Only if the built-in link table is malformed.
    pub fn open() -> Result<Self, PincerError> {
        Self::new(JAW_WIDTH_MAX)
    }

    /// Build the hand at the configured initial width.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn from_config(config: &GripperConfig) -> Result<Self, PincerError> {
        Self::new(config.initial_jaw_width)
    }

    /// Set the jaw width and re-pose the knuckles and fingertips.
    ///
    /// Right knuckles get `+angle`, left knuckles `-angle`, both fingertips
    /// `-angle`, always measured from the construction orientation. On error
    /// no link is touched.
    ///
    /// # Errors
    ///
    /// [`KinematicsError::InvalidArgument`] if `width` is outside `[0, 85]`
    /// or not finite.
    pub fn set_jaw_width(&mut self, width: f32) -> Result<(), KinematicsError> {
        let state = GripperState::solve(width)?;
        self.apply(state);
        debug!(
            jaw_width = state.jaw_width,
            knuckle_angle = state.knuckle_angle,
            branch = ?state.branch,
            "jaw width set"
        );
        Ok(())
    }

    fn apply(&mut self, state: GripperState) {
        for (id, sign) in self.links.driven() {
            self.hierarchy.set_heading(id, sign * state.knuckle_angle);
        }
        self.state = state;
    }

    pub const fn jaw_width(&self) -> f32 {
        self.state.jaw_width
    }

    pub const fn knuckle_angle(&self) -> f32 {
        self.state.knuckle_angle
    }

    pub const fn state(&self) -> GripperState {
        self.state
    }

    pub const fn hierarchy(&self) -> &LinkHierarchy {
        &self.hierarchy
    }

    pub const fn links(&self) -> &Rtq85Links {
        &self.links
    }

    /// Name of the root link.
    pub fn root_name(&self) -> &str {
        self.hierarchy[self.links.base].name()
    }

    pub fn local_pose(&self, id: LinkId) -> Isometry3<f32> {
        self.hierarchy.local_pose(id)
    }

    /// Pose of `id` relative to the gripper base.
    pub fn world_pose(&self, id: LinkId) -> Isometry3<f32> {
        self.hierarchy.world_pose(id)
    }

    /// Poses of every link relative to the gripper base.
    pub fn world_poses(&self) -> Vec<Isometry3<f32>> {
        self.hierarchy.world_poses(&Isometry3::identity())
    }

    /// Poses of every link with the base placed at `root`.
    pub fn placed_poses(&self, root: &Isometry3<f32>) -> Vec<Isometry3<f32>> {
        self.hierarchy.world_poses(root)
    }

    /// Origins of the left and right fingertip frames in the base frame.
    pub fn fingertip_origins(&self) -> (Point3<f32>, Point3<f32>) {
        let left = self.world_pose(self.links.left_fingertip);
        let right = self.world_pose(self.links.right_fingertip);
        (
            Point3::from(left.translation.vector),
            Point3::from(right.translation.vector),
        )
    }

    /// Push every link's local pose to `sink`, parents first.
    pub fn publish(&self, sink: &mut impl LinkPoseSink) {
        for (_, link) in self.hierarchy.iter() {
            sink.set_local_pose(link.name(), &link.local_pose());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Vector3};

    use crate::hierarchy::Hpr;

    fn heading(model: &LinkageModel, id: LinkId) -> f32 {
        model.hierarchy()[id].orientation().heading
    }

    #[test]
    fn fully_open_is_near_zero() {
        let angle = knuckle_angle_for(85.0).unwrap();
        assert!((angle - (-0.05)).abs() < 0.1, "angle={angle}");
    }

    #[test]
    fn fully_closed_uses_closed_branch() {
        let state = GripperState::solve(0.0).unwrap();
        assert_eq!(state.branch, KnuckleBranch::Closed);
        assert_relative_eq!(state.knuckle_angle, 46.019_17, epsilon = 1e-3);
    }

    #[test]
    fn crossover_is_continuous() {
        let at = knuckle_angle_for(10.0).unwrap();
        let below = knuckle_angle_for(10.0 - 1e-3).unwrap();
        let above = knuckle_angle_for(10.0 + 1e-3).unwrap();
        assert_relative_eq!(at, KNUCKLE_REST_ANGLE_DEG, epsilon = 1e-5);
        assert!((below - at).abs() < 1e-2);
        assert!((above - at).abs() < 1e-2);
        assert_eq!(GripperState::solve(10.0).unwrap().branch, KnuckleBranch::Open);
    }

    #[test]
    fn angle_decreases_with_width() {
        let mut prev = f32::INFINITY;
        for w in 0..=85 {
            #[allow(clippy::cast_precision_loss)]
            let angle = knuckle_angle_for(w as f32).unwrap();
            assert!(angle < prev, "not decreasing at width {w}");
            prev = angle;
        }
    }

    #[test]
    fn out_of_range_widths_are_rejected() {
        for w in [-1.0, 86.0, -0.001, 85.001] {
            let err = knuckle_angle_for(w).unwrap_err();
            assert!(err.is_invalid_argument(), "width {w} gave {err:?}");
        }
    }

    #[test]
    fn non_finite_width_is_rejected() {
        assert_eq!(
            knuckle_angle_for(f32::NAN).unwrap_err(),
            KinematicsError::InvalidArgument(ArgumentError::NonFiniteJawWidth)
        );
        assert!(knuckle_angle_for(f32::INFINITY).is_err());
    }

    #[test]
    fn asin_degrees_clamps_drift() {
        assert_relative_eq!(asin_degrees(1.000_001), 90.0, epsilon = 1e-4);
        assert_relative_eq!(asin_degrees(-1.000_001), -90.0, epsilon = 1e-4);
        assert_relative_eq!(asin_degrees(0.5), 30.0, epsilon = 1e-4);
    }

    #[test]
    fn new_applies_initial_width() {
        let model = LinkageModel::new(40.0).unwrap();
        assert_relative_eq!(model.jaw_width(), 40.0);
        let expected = knuckle_angle_for(40.0).unwrap();
        assert_relative_eq!(model.knuckle_angle(), expected);
        assert_relative_eq!(heading(&model, model.links().right_outer_knuckle), expected);
    }

    #[test]
    fn new_rejects_bad_initial_width() {
        let err = LinkageModel::new(90.0).unwrap_err();
        assert!(matches!(
            err,
            PincerError::Kinematics(KinematicsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn from_config_uses_initial_width() {
        let config = GripperConfig {
            initial_jaw_width: 20.0,
        };
        let model = LinkageModel::from_config(&config).unwrap();
        assert_relative_eq!(model.jaw_width(), 20.0);
    }

    #[test]
    fn boundaries_do_not_fail() {
        let mut model = LinkageModel::open().unwrap();
        assert!(model.set_jaw_width(0.0).is_ok());
        assert!(model.set_jaw_width(85.0).is_ok());
    }

    #[test]
    fn set_jaw_width_is_idempotent() {
        let mut model = LinkageModel::open().unwrap();
        model.set_jaw_width(33.0).unwrap();
        let first: Vec<Hpr> = model.hierarchy().iter().map(|(_, l)| l.orientation()).collect();
        model.set_jaw_width(33.0).unwrap();
        let second: Vec<Hpr> = model.hierarchy().iter().map(|(_, l)| l.orientation()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn updates_do_not_accumulate() {
        let mut a = LinkageModel::open().unwrap();
        for w in [3.0, 70.0, 12.0, 50.0] {
            a.set_jaw_width(w).unwrap();
        }
        let b = LinkageModel::new(50.0).unwrap();
        for ((_, la), (_, lb)) in a.hierarchy().iter().zip(b.hierarchy().iter()) {
            assert_eq!(la.orientation(), lb.orientation(), "link {}", la.name());
        }
    }

    #[test]
    fn left_and_right_knuckles_are_symmetric() {
        let mut model = LinkageModel::open().unwrap();
        for w in [0.0, 5.0, 10.0, 42.5, 85.0] {
            model.set_jaw_width(w).unwrap();
            let l = *model.links();
            assert_relative_eq!(
                heading(&model, l.right_outer_knuckle),
                -heading(&model, l.left_outer_knuckle)
            );
            assert_relative_eq!(
                heading(&model, l.right_inner_knuckle),
                -heading(&model, l.left_inner_knuckle)
            );
        }
    }

    #[test]
    fn fingertips_get_negative_angle() {
        let model = LinkageModel::new(25.0).unwrap();
        let l = *model.links();
        let angle = model.knuckle_angle();
        assert_relative_eq!(heading(&model, l.left_fingertip), -angle);
        assert_relative_eq!(heading(&model, l.right_fingertip), -angle);
    }

    #[test]
    fn fixed_links_are_untouched() {
        let mut model = LinkageModel::open().unwrap();
        model.set_jaw_width(7.0).unwrap();
        let l = *model.links();
        assert_eq!(model.hierarchy()[l.left_finger].orientation(), Hpr::ZERO);
        assert_eq!(model.hierarchy()[l.right_finger].orientation(), Hpr::ZERO);
        assert_eq!(model.hierarchy()[l.base].orientation(), Hpr::ZERO);
    }

    #[test]
    fn left_knuckles_keep_their_roll() {
        let model = LinkageModel::new(60.0).unwrap();
        let l = *model.links();
        let hpr = model.hierarchy()[l.left_outer_knuckle].orientation();
        assert_relative_eq!(hpr.roll, 180.0);
        assert_relative_eq!(hpr.pitch, 0.0);
    }

    #[test]
    fn failed_update_leaves_pose_intact() {
        let mut model = LinkageModel::new(30.0).unwrap();
        let before = model.world_poses();
        assert!(model.set_jaw_width(86.0).is_err());
        assert_relative_eq!(model.jaw_width(), 30.0);
        let after = model.world_poses();
        for (b, a) in before.iter().zip(&after) {
            assert_relative_eq!(*b, *a);
        }
    }

    #[test]
    fn fingertips_mirror_across_yz_plane() {
        for w in [0.0, 10.0, 40.0, 85.0] {
            let model = LinkageModel::new(w).unwrap();
            let (left, right) = model.fingertip_origins();
            assert_relative_eq!(left.x, -right.x, epsilon = 1e-4);
            assert_relative_eq!(left.y, right.y, epsilon = 1e-4);
            assert_relative_eq!(left.z, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn fingertips_spread_as_jaw_opens() {
        let narrow = LinkageModel::new(5.0).unwrap().fingertip_origins().1;
        let wide = LinkageModel::new(80.0).unwrap().fingertip_origins().1;
        assert!(wide.x > narrow.x);
    }

    #[test]
    fn fingertips_stay_parallel() {
        let expected_left = Rotation3::from_axis_angle(&Vector3::y_axis(), std::f32::consts::PI);
        for w in [0.0, 25.0, 85.0] {
            let model = LinkageModel::new(w).unwrap();
            let l = *model.links();
            let right = model.world_pose(l.right_fingertip).rotation.to_rotation_matrix();
            let left = model.world_pose(l.left_fingertip).rotation.to_rotation_matrix();
            assert_relative_eq!(right, Rotation3::identity(), epsilon = 1e-5);
            assert_relative_eq!(left, expected_left, epsilon = 1e-5);
        }
    }

    #[test]
    fn placed_poses_offset_the_base() {
        let model = LinkageModel::open().unwrap();
        let root = Isometry3::translation(0.0, 0.0, 100.0);
        let placed = model.placed_poses(&root);
        let local = model.world_poses();
        for (p, l) in placed.iter().zip(&local) {
            assert_relative_eq!(p.translation.z, l.translation.z + 100.0, epsilon = 1e-4);
        }
    }

    #[derive(Default)]
    struct NameSink(Vec<String>);

    impl LinkPoseSink for NameSink {
        fn set_local_pose(&mut self, name: &str, _pose: &Isometry3<f32>) {
            self.0.push(name.to_owned());
        }
    }

    #[test]
    fn publish_visits_every_link_parents_first() {
        let model = LinkageModel::open().unwrap();
        let mut sink = NameSink::default();
        model.publish(&mut sink);
        assert_eq!(sink.0.len(), 9);
        assert_eq!(sink.0[0], model.root_name());
        let finger = sink.0.iter().position(|n| n == "left_finger").unwrap();
        let knuckle = sink.0.iter().position(|n| n == "left_outer_knuckle").unwrap();
        assert!(knuckle < finger);
    }
}
