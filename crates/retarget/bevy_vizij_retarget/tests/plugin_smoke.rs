use std::collections::HashMap;

use bevy::prelude::*;
use bevy_vizij_retarget::{
    FrameInbox, LastTickReport, RetargetInitError, RetargetPlayback, RetargetRigRoot,
    RetargetSetupResource, RigIndex, SetBoneOverride, VizijRetargetEngine, VizijRetargetPlugin,
};
use vizij_retarget_core::{
    parse_body_frame, parse_setup_json, Joint, JointBoneBinding, RetargetConfig, RetargetSetup,
    RigSpec, SkeletonFrame,
};
use vizij_test_fixtures::{captures, rigs, setups};

fn same_rotation(a: Quat, b: Quat) -> bool {
    a.abs_diff_eq(b, 1e-4) || a.abs_diff_eq(-b, 1e-4)
}

fn app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(VizijRetargetPlugin);
    app
}

/// root → Hips → Spine → Head; the root itself is unnamed.
fn spawn_chain(app: &mut App) -> HashMap<&'static str, Entity> {
    let world = app.world_mut();
    let root = world.spawn((RetargetRigRoot, Transform::default())).id();
    let mut out = HashMap::new();
    let mut parent = root;
    for name in ["Hips", "Spine", "Head"] {
        let e = world.spawn((Name::new(name), Transform::default())).id();
        world.entity_mut(parent).add_child(e);
        out.insert(name, e);
        parent = e;
    }
    out
}

fn snap_setup(bindings: Vec<JointBoneBinding>) -> RetargetSetupResource {
    RetargetSetupResource(RetargetSetup {
        config: RetargetConfig {
            blend_factor: 1.0,
            ..Default::default()
        },
        bindings,
        ..Default::default()
    })
}

fn rotation(app: &App, e: Entity) -> Quat {
    app.world().get::<Transform>(e).unwrap().rotation
}

#[test]
fn plugin_inserts_resources() {
    let app = app();
    assert!(app.world().get_resource::<FrameInbox>().is_some());
    assert!(app.world().get_resource::<RigIndex>().is_some());
    assert!(app.world().get_resource::<RetargetPlayback>().unwrap().playing);
    // No setup yet, so no engine.
    assert!(app.world().get_resource::<VizijRetargetEngine>().is_none());
}

#[test]
fn retargets_latest_frame_onto_transforms() {
    let mut app = app();
    let bones = spawn_chain(&mut app);
    app.insert_resource(snap_setup(vec![
        JointBoneBinding::new(0, "Hips"),
        JointBoneBinding::new(3, "Head"),
    ]));

    let hips_q = Quat::from_rotation_y(0.5);
    let head_q = Quat::from_rotation_x(0.4);
    app.world()
        .resource::<FrameInbox>()
        .0
        .push(
            SkeletonFrame::new(7)
                .with_joint(Joint::new(0, hips_q.to_array()))
                .with_joint(Joint::new(3, head_q.to_array())),
        );
    app.update();

    let index = app.world().resource::<RigIndex>();
    assert_eq!(index.by_name.len(), 3);
    assert_eq!(index.parents.get("Head").map(String::as_str), Some("Spine"));
    assert!(index.parents.get("Hips").is_none());
    assert!(app.world().get_resource::<VizijRetargetEngine>().is_some());

    let report = &app.world().resource::<LastTickReport>().0;
    assert_eq!(report.frame_sequence, Some(7));
    assert_eq!(report.writes.len(), 2);

    assert!(same_rotation(rotation(&app, bones["Hips"]), hips_q));
    let head_world =
        rotation(&app, bones["Hips"]) * rotation(&app, bones["Spine"]) * rotation(&app, bones["Head"]);
    assert!(same_rotation(head_world, head_q));
    assert!(same_rotation(rotation(&app, bones["Spine"]), Quat::IDENTITY));
}

#[test]
fn missing_bone_records_init_error() {
    let mut app = app();
    spawn_chain(&mut app);
    app.insert_resource(snap_setup(vec![JointBoneBinding::new(4, "LeftShoulder")]));
    app.update();
    app.update();
    assert!(app.world().get_resource::<VizijRetargetEngine>().is_none());
    assert!(app.world().get_resource::<RetargetInitError>().is_some());
}

#[test]
fn reinserted_setup_replaces_running_engine() {
    let mut app = app();
    spawn_chain(&mut app);
    app.insert_resource(snap_setup(vec![JointBoneBinding::new(0, "Hips")]));
    app.update();
    assert!(app.world().get_resource::<VizijRetargetEngine>().is_some());

    app.world_mut().remove_resource::<RetargetSetupResource>();
    app.update();
    app.insert_resource(snap_setup(vec![JointBoneBinding::new(4, "LeftShoulder")]));
    app.update();
    assert!(app.world().get_resource::<VizijRetargetEngine>().is_none());
    assert!(app.world().get_resource::<RetargetInitError>().is_some());

    app.world_mut().remove_resource::<RetargetSetupResource>();
    app.insert_resource(snap_setup(vec![
        JointBoneBinding::new(0, "Hips"),
        JointBoneBinding::new(3, "Head"),
    ]));
    app.update();
    assert!(app.world().get_resource::<RetargetInitError>().is_none());
    let engine = app.world().resource::<VizijRetargetEngine>();
    assert_eq!(engine.0.bound_bones().count(), 2);
}

#[test]
fn paused_playback_leaves_rig_untouched() {
    let mut app = app();
    let bones = spawn_chain(&mut app);
    app.insert_resource(snap_setup(vec![JointBoneBinding::new(0, "Hips")]));
    app.world_mut().resource_mut::<RetargetPlayback>().playing = false;
    app.world()
        .resource::<FrameInbox>()
        .0
        .push(SkeletonFrame::new(0).with_joint(Joint::new(0, Quat::from_rotation_z(1.0).to_array())));
    app.update();
    assert_eq!(rotation(&app, bones["Hips"]), Quat::IDENTITY);

    app.world_mut().resource_mut::<RetargetPlayback>().playing = true;
    app.update();
    assert!(same_rotation(rotation(&app, bones["Hips"]), Quat::from_rotation_z(1.0)));
}

#[test]
fn override_event_pins_a_bone() {
    let mut app = app();
    let bones = spawn_chain(&mut app);
    app.insert_resource(snap_setup(vec![JointBoneBinding::new(3, "Head")]));
    app.world()
        .resource::<FrameInbox>()
        .0
        .push(SkeletonFrame::new(0).with_joint(Joint::new(3, Quat::from_rotation_x(0.3).to_array())));
    app.update();

    let pinned = Quat::from_rotation_y(-0.8);
    app.world_mut().send_event(SetBoneOverride {
        bone: "Head".into(),
        rotation: Some(pinned),
    });
    app.update();
    assert!(same_rotation(rotation(&app, bones["Head"]), pinned));

    app.world_mut().send_event(SetBoneOverride {
        bone: "Head".into(),
        rotation: None,
    });
    app.update();
    assert!(same_rotation(rotation(&app, bones["Head"]), Quat::from_rotation_x(0.3)));
}

#[test]
fn fixture_capture_drives_mixamo_rig() {
    let mut app = app();
    let spec: RigSpec = serde_json::from_str(&rigs::json("mixamo_min").unwrap()).unwrap();
    {
        let world = app.world_mut();
        let root = world.spawn((RetargetRigRoot, Transform::default())).id();
        let mut spawned: HashMap<String, Entity> = HashMap::new();
        for bone in &spec.bones {
            let [x, y, z, w] = bone.rest;
            let e = world
                .spawn((
                    Name::new(bone.id.clone()),
                    Transform::from_rotation(Quat::from_xyzw(x, y, z, w).normalize()),
                ))
                .id();
            let parent = bone
                .parent
                .as_ref()
                .and_then(|p| spawned.get(p).copied())
                .unwrap_or(root);
            world.entity_mut(parent).add_child(e);
            spawned.insert(bone.id.clone(), e);
        }
    }
    let setup = parse_setup_json(&setups::json("kinect_mixamo").unwrap()).unwrap();
    app.insert_resource(RetargetSetupResource(setup));

    for (i, json) in captures::frames_json("wave").unwrap().iter().enumerate() {
        let frame = parse_body_frame(json, i as u64).unwrap().skeleton.unwrap();
        app.world().resource::<FrameInbox>().0.push(frame);
        app.update();
        let report = &app.world().resource::<LastTickReport>().0;
        assert_eq!(report.frame_sequence, Some(i as u64));
        assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
        assert_eq!(report.writes.len(), 19);
    }
}
