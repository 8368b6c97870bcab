//! Identifiers for source joints and target bones.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a joint in the tracked source skeleton (e.g. Kinect v2 `0..=24`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct JointIndex(pub u32);

impl fmt::Display for JointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for JointIndex {
    fn from(value: u32) -> Self {
        JointIndex(value)
    }
}

/// Target bone identifier (the bone's name in the rig).
pub type BoneId = String;
