//! Error types for retarget construction and per-tick skip reasons.

use serde::{Deserialize, Serialize};

use crate::ids::JointIndex;

/// Static-configuration failures. These only occur while building a rig, a
/// binding table or an engine; a running tick never returns them.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RetargetError {
    /// A binding names a bone the target rig does not contain.
    #[error("bone '{bone}' bound to joint {joint} does not exist in the target rig")]
    MissingBone { bone: String, joint: JointIndex },

    /// The rig description lists the same bone id twice.
    #[error("duplicate bone id '{bone}' in rig")]
    DuplicateBone { bone: String },

    /// Two bindings drive the same bone.
    #[error("bone '{bone}' is bound more than once")]
    DuplicateBinding { bone: String },

    /// A bone references a parent that is not part of the rig.
    #[error("bone '{bone}' references unknown parent '{parent}'")]
    UnknownParent { bone: String, parent: String },

    /// Parent links loop back onto themselves.
    #[error("bone hierarchy contains a cycle through '{bone}'")]
    HierarchyCycle { bone: String },

    #[error("invalid retarget config: {reason}")]
    InvalidConfig { reason: String },

    /// JSON configuration or frame payload failed to parse.
    #[error("parse error: {reason}")]
    Parse { reason: String },
}

impl From<serde_json::Error> for RetargetError {
    fn from(err: serde_json::Error) -> Self {
        RetargetError::Parse {
            reason: err.to_string(),
        }
    }
}

/// Why a binding produced no update this tick. Recovered locally; the bone
/// keeps its previous pose.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    #[error("joint {0} is absent from the frame")]
    MissingJoint(JointIndex),

    /// Zero or non-finite orientation with no usable fallback.
    #[error("joint {0} has no usable orientation")]
    DegenerateOrientation(JointIndex),

    #[error("joint {0} is not tracked")]
    NotTracked(JointIndex),

    /// The sink could not report the parent's world orientation.
    #[error("parent world orientation unavailable")]
    ParentUnavailable,
}
