//! Kinect v2 body-frame JSON → [`SkeletonFrame`].
//!
//! Accepts the body frame as emitted by Node Kinect bridges
//! (`{ "bodies": [...], "floorClipPlane": {...} }`), optionally wrapped in a
//! replay envelope (`{ "data": { ... } }`). Only the first tracked body is
//! converted.

use serde::Deserialize;

use crate::errors::RetargetError;
use crate::frame::{Joint, SkeletonFrame, TrackingState};
use crate::ids::JointIndex;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JointJson {
    #[serde(default)]
    camera_x: f32,
    #[serde(default)]
    camera_y: f32,
    #[serde(default)]
    camera_z: f32,
    #[serde(default)]
    orientation_x: f32,
    #[serde(default)]
    orientation_y: f32,
    #[serde(default)]
    orientation_z: f32,
    #[serde(default)]
    orientation_w: f32,
    #[serde(default)]
    tracking_state: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct BodyJson {
    #[serde(default)]
    tracked: bool,
    #[serde(default)]
    joints: Vec<Option<JointJson>>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct PlaneJson {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BodyFrameJson {
    #[serde(default)]
    bodies: Vec<Option<BodyJson>>,
    #[serde(default)]
    floor_clip_plane: Option<PlaneJson>,
}

/// A converted Kinect body frame.
#[derive(Clone, Debug, PartialEq)]
pub struct KinectFrame {
    /// `None` when no body in the frame is tracked.
    pub skeleton: Option<SkeletonFrame>,
    /// Floor plane `(x, y, z, w)` in camera space, when reported.
    pub floor_clip_plane: Option<[f32; 4]>,
}

fn tracking_state(raw: Option<u8>) -> TrackingState {
    match raw {
        Some(0) => TrackingState::NotTracked,
        Some(1) => TrackingState::Inferred,
        _ => TrackingState::Tracked,
    }
}

/// Parse one Kinect v2 body frame, stamping the result with `sequence`.
pub fn parse_body_frame(json: &str, sequence: u64) -> Result<KinectFrame, RetargetError> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;
    let payload = if value.get("data").is_some() {
        value["data"].take()
    } else {
        value
    };
    if payload.is_null() {
        return Ok(KinectFrame {
            skeleton: None,
            floor_clip_plane: None,
        });
    }
    let frame: BodyFrameJson = serde_json::from_value(payload)?;

    let floor_clip_plane = frame.floor_clip_plane.map(|p| [p.x, p.y, p.z, p.w]);
    let body = frame.bodies.into_iter().flatten().find(|b| b.tracked);
    let skeleton = body.map(|body| {
        let mut skeleton = SkeletonFrame::new(sequence);
        for (i, joint) in body.joints.into_iter().enumerate() {
            let Some(j) = joint else { continue };
            skeleton.insert(
                Joint::new(
                    JointIndex(i as u32),
                    [j.orientation_x, j.orientation_y, j.orientation_z, j.orientation_w],
                )
                .with_position([j.camera_x, j.camera_y, j.camera_z])
                .with_tracking_state(tracking_state(j.tracking_state)),
            );
        }
        skeleton
    });

    Ok(KinectFrame {
        skeleton,
        floor_clip_plane,
    })
}
