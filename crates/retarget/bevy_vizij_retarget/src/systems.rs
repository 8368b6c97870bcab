use bevy::log::{debug, error, warn};
use bevy::prelude::*;

use crate::components::{RetargetBoneHint, RetargetRigRoot};
use crate::resources::{
    FrameInbox, LastTickReport, RetargetInitError, RetargetPlayback, RetargetSetupResource,
    RigIndex, SetBoneOverride, VizijRetargetEngine,
};
use crate::sink::TransformSink;
use vizij_retarget_core::RetargetEngine;

/// Walks descendants under each `RetargetRigRoot` and rebuilds the `RigIndex`
/// whenever a root is added or the index is empty. A rebuilt index drops the
/// engine so it is constructed again against the new rig.
pub fn build_rig_index_system(
    mut commands: Commands,
    roots: Query<Entity, With<RetargetRigRoot>>,
    added: Query<(), Added<RetargetRigRoot>>,
    children: Query<&Children>,
    names: Query<(Option<&Name>, Option<&RetargetBoneHint>)>,
    mut index: ResMut<RigIndex>,
) {
    if added.is_empty() && !index.is_empty() {
        return;
    }
    if roots.is_empty() {
        return;
    }

    // Depth-first traversal carrying the nearest indexed ancestor.
    fn walk(
        e: Entity,
        parent: Option<&str>,
        index: &mut RigIndex,
        names: &Query<(Option<&Name>, Option<&RetargetBoneHint>)>,
        children: &Query<&Children>,
    ) {
        let own = match names.get(e) {
            Ok((_, Some(hint))) => Some(hint.bone.clone()),
            Ok((Some(name), None)) => Some(name.as_str().to_string()),
            _ => None,
        };
        if let Some(id) = &own {
            if index.by_name.contains_key(id) {
                warn!("duplicate bone name '{id}' under rig root; keeping the first");
            } else {
                index.by_name.insert(id.clone(), e);
                index.by_entity.insert(e, id.clone());
                if let Some(p) = parent {
                    index.parents.insert(id.clone(), p.to_string());
                }
            }
        }
        let next_parent = own.as_deref().or(parent).map(str::to_string);
        if let Ok(cs) = children.get(e) {
            for &c in cs.iter() {
                walk(c, next_parent.as_deref(), index, names, children);
            }
        }
    }

    index.clear();
    for root in roots.iter() {
        walk(root, None, &mut index, &names, &children);
    }
    debug!("rig index rebuilt: {} bones", index.by_name.len());

    commands.remove_resource::<VizijRetargetEngine>();
    commands.remove_resource::<RetargetInitError>();
}

/// Builds the engine once a setup is present and the rig is indexed.
/// Construction errors are logged once and kept in `RetargetInitError`.
pub fn init_engine_system(
    mut commands: Commands,
    engine: Option<Res<VizijRetargetEngine>>,
    failed: Option<Res<RetargetInitError>>,
    setup: Option<Res<RetargetSetupResource>>,
    index: Res<RigIndex>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(setup) = setup else {
        return;
    };
    // A re-inserted setup reads as added; it still replaces a prior engine.
    let setup_changed =
        setup.is_changed() && (!setup.is_added() || engine.is_some() || failed.is_some());
    if !setup_changed && (engine.is_some() || failed.is_some()) {
        return;
    }
    if index.is_empty() {
        return;
    }
    if setup_changed {
        commands.remove_resource::<VizijRetargetEngine>();
        commands.remove_resource::<RetargetInitError>();
    }

    let sink = TransformSink::new(&index, &mut transforms);
    let built = setup
        .0
        .build()
        .and_then(|(cfg, table)| RetargetEngine::new(cfg, table, &sink));
    match built {
        Ok(engine) => {
            debug!(
                "retarget engine built for {} bound bones",
                engine.bound_bones().count()
            );
            commands.insert_resource(VizijRetargetEngine(engine));
        }
        Err(err) => {
            error!("retarget engine construction failed: {err}");
            commands.insert_resource(RetargetInitError(err));
        }
    }
}

/// Forwards `SetBoneOverride` events to the engine's override map.
pub fn apply_override_events_system(
    mut events: EventReader<SetBoneOverride>,
    engine: Option<ResMut<VizijRetargetEngine>>,
) {
    let Some(mut engine) = engine else {
        events.clear();
        return;
    };
    for ev in events.read() {
        let overrides = engine.0.overrides_mut();
        match ev.rotation {
            Some(q) => {
                if !overrides.set(ev.bone.clone(), q.to_array()) {
                    warn!("ignoring degenerate override for '{}'", ev.bone);
                }
            }
            None => {
                overrides.remove(&ev.bone);
            }
        }
    }
}

pub fn retarget_playing(playback: Res<RetargetPlayback>) -> bool {
    playback.playing
}

/// One retarget pass over the latest inbox frame, written straight into the
/// rig's `Transform`s.
pub fn retarget_tick_system(
    engine: Option<ResMut<VizijRetargetEngine>>,
    inbox: Res<FrameInbox>,
    index: Res<RigIndex>,
    mut transforms: Query<&mut Transform>,
    mut last: ResMut<LastTickReport>,
) {
    let Some(mut engine) = engine else {
        return;
    };
    let mut sink = TransformSink::new(&index, &mut transforms);
    let report = engine.0.tick_latest(&inbox.0, &mut sink);
    last.0.clone_from(report);
}
