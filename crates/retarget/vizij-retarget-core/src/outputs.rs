//! Per-tick report returned by the engine.
//!
//! The sink has already been written when a report is returned; the report
//! mirrors those writes for adapters that forward poses elsewhere (network,
//! recording) and lists bindings that were skipped this tick.

use serde::{Deserialize, Serialize};

use crate::errors::SkipReason;
use crate::ids::BoneId;
use crate::math::Quat;

/// One local orientation written to the sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneWrite {
    pub bone: BoneId,
    pub local: Quat,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedBinding {
    pub bone: BoneId,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Sequence id of the processed frame; `None` when no frame was available.
    #[serde(default)]
    pub frame_sequence: Option<u64>,
    /// Retargeted writes in processing (root-to-leaf) order.
    #[serde(default)]
    pub writes: Vec<BoneWrite>,
    /// Override writes applied after the retarget pass.
    #[serde(default)]
    pub overrides: Vec<BoneWrite>,
    #[serde(default)]
    pub skipped: Vec<SkippedBinding>,
}

impl TickReport {
    #[inline]
    pub fn clear(&mut self) {
        self.frame_sequence = None;
        self.writes.clear();
        self.overrides.clear();
        self.skipped.clear();
    }

    #[inline]
    pub fn push_write(&mut self, bone: &str, local: Quat) {
        self.writes.push(BoneWrite {
            bone: bone.to_owned(),
            local,
        });
    }

    #[inline]
    pub fn push_skip(&mut self, bone: &str, reason: SkipReason) {
        self.skipped.push(SkippedBinding {
            bone: bone.to_owned(),
            reason,
        });
    }

    pub fn write_for(&self, bone: &str) -> Option<&BoneWrite> {
        self.writes.iter().find(|w| w.bone == bone)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.overrides.is_empty() && self.skipped.is_empty()
    }
}
