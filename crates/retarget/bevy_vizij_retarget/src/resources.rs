use bevy::prelude::*;
use hashbrown::HashMap;
use vizij_retarget_core::{
    FrameIngest, FrameSender, RetargetEngine, RetargetError, RetargetSetup, TickReport,
};

/// The engine, inserted once the rig is indexed and the setup builds.
#[derive(Resource)]
pub struct VizijRetargetEngine(pub RetargetEngine);

/// Config and bindings the engine is built from.
#[derive(Resource, Clone, Debug, Default)]
pub struct RetargetSetupResource(pub RetargetSetup);

/// Construction failure for the current rig index. Cleared when the index is
/// rebuilt or the setup changes.
#[derive(Resource, Clone, Debug)]
pub struct RetargetInitError(pub RetargetError);

/// Latest-frame register the tracker side pushes into.
#[derive(Resource, Clone, Debug, Default)]
pub struct FrameInbox(pub FrameIngest);

impl FrameInbox {
    /// Producer handle usable from other threads.
    pub fn sender(&self) -> FrameSender {
        self.0.sender()
    }
}

/// Playback gate: ticks run only while `playing`.
#[derive(Resource, Clone, Copy, Debug)]
pub struct RetargetPlayback {
    pub playing: bool,
}

impl Default for RetargetPlayback {
    fn default() -> Self {
        Self { playing: true }
    }
}

/// Bone id ↔ entity mapping built by walking under `RetargetRigRoot`.
///
/// `parents` records the nearest indexed ancestor of each bone; entities
/// without a `Name` are transparent.
#[derive(Resource, Default, Debug)]
pub struct RigIndex {
    pub by_name: HashMap<String, Entity>,
    pub by_entity: HashMap<Entity, String>,
    pub parents: HashMap<String, String>,
}

impl RigIndex {
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_entity.clear();
        self.parents.clear();
    }
}

/// Report of the most recent retarget tick.
#[derive(Resource, Default, Debug, Clone)]
pub struct LastTickReport(pub TickReport);

/// Pin (`Some`) or release (`None`) a bone's local rotation.
#[derive(Event, Debug, Clone)]
pub struct SetBoneOverride {
    pub bone: String,
    pub rotation: Option<Quat>,
}
