//! Bevy integration for `vizij-retarget-core`.
//!
//! Tag a rig hierarchy with [`RetargetRigRoot`], insert a
//! [`RetargetSetupResource`], and push tracker frames into [`FrameInbox`].
//! Each `Update` the plugin retargets the latest frame onto the rig's
//! `Transform`s while [`RetargetPlayback::playing`] is set.

use bevy::prelude::*;

pub mod components;
pub mod resources;
pub mod sink;
pub mod systems;

pub use components::{RetargetBoneHint, RetargetRigRoot};
pub use resources::{
    FrameInbox, LastTickReport, RetargetInitError, RetargetPlayback, RetargetSetupResource,
    RigIndex, SetBoneOverride, VizijRetargetEngine,
};
pub use sink::TransformSink;

pub struct VizijRetargetPlugin;

impl Plugin for VizijRetargetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameInbox>()
            .init_resource::<RetargetPlayback>()
            .init_resource::<RigIndex>()
            .init_resource::<LastTickReport>()
            .add_event::<SetBoneOverride>()
            .add_systems(
                Update,
                (
                    systems::build_rig_index_system,
                    systems::init_engine_system,
                    systems::apply_override_events_system,
                    systems::retarget_tick_system.run_if(systems::retarget_playing),
                )
                    .chain(),
            );
    }
}
