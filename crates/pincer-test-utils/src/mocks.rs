//! Mock implementations of the collaborator traits for testing.

use nalgebra::{Isometry3, Matrix4};
use pincer_core::traits::{LinkPoseSink, RootPlacementSink};

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// One call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    LocalPose {
        name: String,
        pose: Isometry3<f32>,
    },
    RootTransform {
        name: String,
        transform: Matrix4<f32>,
    },
}

/// Records every pose and placement pushed into it, in call order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent local pose received for `name`.
    pub fn last_local(&self, name: &str) -> Option<&Isometry3<f32>> {
        self.events.iter().rev().find_map(|e| match e {
            SinkEvent::LocalPose { name: n, pose } if n == name => Some(pose),
            _ => None,
        })
    }

    /// Most recent root transform received for `name`.
    pub fn last_root(&self, name: &str) -> Option<&Matrix4<f32>> {
        self.events.iter().rev().find_map(|e| match e {
            SinkEvent::RootTransform { name: n, transform } if n == name => Some(transform),
            _ => None,
        })
    }

    /// Link names in the order their poses arrived.
    pub fn local_names(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::LocalPose { name, .. } => Some(name.as_str()),
                SinkEvent::RootTransform { .. } => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl LinkPoseSink for RecordingSink {
    fn set_local_pose(&mut self, name: &str, pose: &Isometry3<f32>) {
        self.events.push(SinkEvent::LocalPose {
            name: name.to_owned(),
            pose: *pose,
        });
    }
}

impl RootPlacementSink for RecordingSink {
    fn set_root_transform(&mut self, name: &str, transform: &Matrix4<f32>) {
        self.events.push(SinkEvent::RootTransform {
            name: name.to_owned(),
            transform: *transform,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
