//! Tracked skeleton frames and the last-value-wins frame register.
//!
//! Frame sources (sockets, replay, pose estimators) push through a cloneable
//! [`FrameSender`]; the engine reads the most recent complete frame from
//! [`FrameIngest`] once per tick. Frames overwritten before being read are
//! dropped and counted, so a fast producer never builds up queued lag.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::ids::JointIndex;
use crate::math::Quat;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingState {
    #[default]
    NotTracked,
    Inferred,
    Tracked,
}

/// One tracked joint as delivered by the frame source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub index: JointIndex,
    #[serde(default)]
    pub position: [f32; 3],
    /// `(x, y, z, w)`; all zeros means the source computed no orientation.
    pub orientation: Quat,
    #[serde(default)]
    pub tracking_state: TrackingState,
}

impl Joint {
    pub fn new(index: impl Into<JointIndex>, orientation: Quat) -> Self {
        Self {
            index: index.into(),
            position: [0.0; 3],
            orientation,
            tracking_state: TrackingState::Tracked,
        }
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_tracking_state(mut self, state: TrackingState) -> Self {
        self.tracking_state = state;
        self
    }
}

/// A complete skeleton sample: joints keyed by index plus a sequence id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonFrame {
    #[serde(default)]
    pub sequence: u64,
    /// Source timestamp in milliseconds, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<f64>,
    #[serde(default)]
    pub joints: BTreeMap<JointIndex, Joint>,
}

impl SkeletonFrame {
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            ..Self::default()
        }
    }

    /// Insert a joint, replacing any joint already stored at the same index.
    pub fn insert(&mut self, joint: Joint) {
        self.joints.insert(joint.index, joint);
    }

    pub fn with_joint(mut self, joint: Joint) -> Self {
        self.insert(joint);
        self
    }

    #[inline]
    pub fn get(&self, index: JointIndex) -> Option<&Joint> {
        self.joints.get(&index)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

#[derive(Debug, Default)]
struct Slot {
    frame: Option<Arc<SkeletonFrame>>,
    /// Set on push, cleared when the engine reads the frame.
    unread: bool,
    delivered: u64,
    dropped: u64,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    // Writes are single assignments; a poisoned slot is still consistent.
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counters describing how frames moved through the register.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Frames pushed by producers.
    pub delivered: u64,
    /// Frames replaced before the engine read them.
    pub dropped: u64,
}

/// Last-value-wins frame register read by the engine.
#[derive(Debug, Default, Clone)]
pub struct FrameIngest {
    slot: Arc<Mutex<Slot>>,
}

/// Producer handle for a [`FrameIngest`]; cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct FrameSender {
    slot: Arc<Mutex<Slot>>,
}

impl FrameIngest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> FrameSender {
        FrameSender {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Deliver a frame directly (pull-style sources polled on the host thread).
    pub fn push(&self, frame: SkeletonFrame) {
        push_into(&self.slot, frame);
    }

    /// Most recent frame, marking it as read. Returns the same frame again on
    /// later ticks until a newer one arrives.
    pub fn latest(&self) -> Option<Arc<SkeletonFrame>> {
        let mut slot = lock(&self.slot);
        slot.unread = false;
        slot.frame.clone()
    }

    /// True when a frame arrived since the last [`FrameIngest::latest`] call.
    pub fn has_unread(&self) -> bool {
        lock(&self.slot).unread
    }

    pub fn stats(&self) -> IngestStats {
        let slot = lock(&self.slot);
        IngestStats {
            delivered: slot.delivered,
            dropped: slot.dropped,
        }
    }
}

impl FrameSender {
    pub fn send(&self, frame: SkeletonFrame) {
        push_into(&self.slot, frame);
    }
}

fn push_into(slot: &Mutex<Slot>, frame: SkeletonFrame) {
    let mut slot = lock(slot);
    if slot.unread {
        slot.dropped += 1;
    }
    slot.frame = Some(Arc::new(frame));
    slot.unread = true;
    slot.delivered += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::IDENTITY;

    #[test]
    fn insert_replaces_same_index() {
        let mut frame = SkeletonFrame::new(1);
        frame.insert(Joint::new(3, IDENTITY));
        frame.insert(Joint::new(3, [0.0, 0.0, 1.0, 0.0]));
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get(JointIndex(3)).unwrap().orientation, [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn ingest_keeps_only_latest_and_counts_drops() {
        let ingest = FrameIngest::new();
        assert!(ingest.latest().is_none());

        let tx = ingest.sender();
        tx.send(SkeletonFrame::new(1));
        tx.send(SkeletonFrame::new(2));
        ingest.push(SkeletonFrame::new(3));
        assert!(ingest.has_unread());

        let latest = ingest.latest().unwrap();
        assert_eq!(latest.sequence, 3);
        assert!(!ingest.has_unread());
        assert_eq!(
            ingest.stats(),
            IngestStats {
                delivered: 3,
                dropped: 2
            }
        );

        // Re-reading without a new push yields the same frame.
        assert_eq!(ingest.latest().unwrap().sequence, 3);
    }

    #[test]
    fn sender_works_across_threads() {
        let ingest = FrameIngest::new();
        let tx = ingest.sender();
        std::thread::spawn(move || {
            for seq in 0..10 {
                tx.send(SkeletonFrame::new(seq));
            }
        })
        .join()
        .unwrap();
        assert_eq!(ingest.latest().unwrap().sequence, 9);
        assert_eq!(ingest.stats().delivered, 10);
    }

    #[test]
    fn frame_json_defaults() {
        let frame: SkeletonFrame = serde_json::from_str(
            r#"{"sequence":7,"joints":{"3":{"index":3,"orientation":[0,0,0,1]}}}"#,
        )
        .unwrap();
        let head = frame.get(JointIndex(3)).unwrap();
        assert_eq!(head.tracking_state, TrackingState::NotTracked);
        assert_eq!(head.position, [0.0; 3]);
    }
}
