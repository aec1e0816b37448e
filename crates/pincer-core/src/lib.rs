// pincer-core: Errors, configuration, shared types and collaborator traits for pincer.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub mod prelude {
    pub use crate::config::{FramePolicy, GripperConfig, PincerConfig, PlacementConfig};
    pub use crate::error::{
        ArgumentError, ConfigError, HierarchyError, KinematicsError, PincerError,
    };
    pub use crate::traits::{LinkPoseSink, RootPlacementSink};
    pub use crate::types::{GripperId, JAW_WIDTH_MAX, JAW_WIDTH_MIN};
}
