//! Plain shared types and constants.

use std::fmt;

/// Narrowest jaw opening the hand can reach.
pub const JAW_WIDTH_MIN: f32 = 0.0;

/// Widest jaw opening the hand can reach.
pub const JAW_WIDTH_MAX: f32 = 85.0;

/// Identifies one gripper instance when several share a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GripperId(pub u32);

impl fmt::Display for GripperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gripper#{}", self.0)
    }
}
