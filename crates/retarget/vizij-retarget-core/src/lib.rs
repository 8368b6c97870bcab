//! Vizij Retarget Core (engine-agnostic)
//!
//! Maps tracked skeleton frames (per-joint world orientations from a body
//! tracker) onto an articulated target rig. Each tick resolves a source
//! orientation per bound bone, composes it with static corrections and the
//! global calibration, damps near-180° flips, converts to parent-relative
//! local space, smooths, and writes the result through a [`BonePoseSink`].
//!
//! Adapters provide the sink (see `bevy_vizij_retarget`); [`BoneGraph`] is the
//! in-memory implementation used for tests and headless runs.

pub mod binding;
pub mod config;
pub mod engine;
pub mod errors;
pub mod flip;
pub mod frame;
pub mod ids;
pub mod kinect;
pub mod localize;
pub mod math;
pub mod outputs;
pub mod overrides;
pub mod presets;
pub mod resolve;
pub mod rig;
pub mod setup;
pub mod smooth;
pub mod state;
pub mod transform;

// Re-exports for consumers (adapters)
pub use binding::{BoundJoint, Correction, JointBindingTable, JointBoneBinding};
pub use config::{Calibration, CompositionOrder, RetargetConfig};
pub use engine::RetargetEngine;
pub use errors::{RetargetError, SkipReason};
pub use flip::FlipGuard;
pub use frame::{FrameIngest, FrameSender, IngestStats, Joint, SkeletonFrame, TrackingState};
pub use ids::{BoneId, JointIndex};
pub use kinect::{parse_body_frame, KinectFrame};
pub use localize::localize;
pub use math::{Quat, IDENTITY};
pub use outputs::{BoneWrite, SkippedBinding, TickReport};
pub use overrides::PoseOverrides;
pub use resolve::Resolver;
pub use rig::{BoneGraph, BonePoseSink, BoneSpec, RigSpec};
pub use setup::{parse_setup_json, RetargetSetup, SetupPreset};
pub use smooth::Smoother;
pub use state::{BoneState, RetargetState};
pub use transform::{floor_tilt_from_clip_plane, RetargetTransform};
