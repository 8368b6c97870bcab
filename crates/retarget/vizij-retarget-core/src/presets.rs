//! Ready-made binding tables for common source/rig pairs.

use crate::binding::JointBoneBinding;
use crate::ids::JointIndex;

/// Kinect v2 body joint indices.
pub mod kinect_v2 {
    use crate::ids::JointIndex;

    pub const SPINE_BASE: JointIndex = JointIndex(0);
    pub const SPINE_MID: JointIndex = JointIndex(1);
    pub const NECK: JointIndex = JointIndex(2);
    pub const HEAD: JointIndex = JointIndex(3);
    pub const SHOULDER_LEFT: JointIndex = JointIndex(4);
    pub const ELBOW_LEFT: JointIndex = JointIndex(5);
    pub const WRIST_LEFT: JointIndex = JointIndex(6);
    pub const HAND_LEFT: JointIndex = JointIndex(7);
    pub const SHOULDER_RIGHT: JointIndex = JointIndex(8);
    pub const ELBOW_RIGHT: JointIndex = JointIndex(9);
    pub const WRIST_RIGHT: JointIndex = JointIndex(10);
    pub const HAND_RIGHT: JointIndex = JointIndex(11);
    pub const HIP_LEFT: JointIndex = JointIndex(12);
    pub const KNEE_LEFT: JointIndex = JointIndex(13);
    pub const ANKLE_LEFT: JointIndex = JointIndex(14);
    pub const FOOT_LEFT: JointIndex = JointIndex(15);
    pub const HIP_RIGHT: JointIndex = JointIndex(16);
    pub const KNEE_RIGHT: JointIndex = JointIndex(17);
    pub const ANKLE_RIGHT: JointIndex = JointIndex(18);
    pub const FOOT_RIGHT: JointIndex = JointIndex(19);
    pub const SPINE_SHOULDER: JointIndex = JointIndex(20);
    pub const HAND_TIP_LEFT: JointIndex = JointIndex(21);
    pub const THUMB_LEFT: JointIndex = JointIndex(22);
    pub const HAND_TIP_RIGHT: JointIndex = JointIndex(23);
    pub const THUMB_RIGHT: JointIndex = JointIndex(24);

    pub const JOINT_COUNT: u32 = 25;

    const NAMES: [&str; JOINT_COUNT as usize] = [
        "SpineBase",
        "SpineMid",
        "Neck",
        "Head",
        "ShoulderLeft",
        "ElbowLeft",
        "WristLeft",
        "HandLeft",
        "ShoulderRight",
        "ElbowRight",
        "WristRight",
        "HandRight",
        "HipLeft",
        "KneeLeft",
        "AnkleLeft",
        "FootLeft",
        "HipRight",
        "KneeRight",
        "AnkleRight",
        "FootRight",
        "SpineShoulder",
        "HandTipLeft",
        "ThumbLeft",
        "HandTipRight",
        "ThumbRight",
    ];

    pub fn name(joint: JointIndex) -> Option<&'static str> {
        NAMES.get(joint.0 as usize).copied()
    }

    /// Leaf joints the sensor reports without orientation, and the joint whose
    /// orientation stands in for them.
    pub const LEAF_FALLBACKS: [(JointIndex, JointIndex); 8] = [
        (HAND_LEFT, WRIST_LEFT),
        (HAND_RIGHT, WRIST_RIGHT),
        (HAND_TIP_LEFT, WRIST_LEFT),
        (THUMB_LEFT, WRIST_LEFT),
        (HAND_TIP_RIGHT, WRIST_RIGHT),
        (THUMB_RIGHT, WRIST_RIGHT),
        (FOOT_LEFT, ANKLE_LEFT),
        (FOOT_RIGHT, ANKLE_RIGHT),
    ];

    pub fn leaf_fallback(joint: JointIndex) -> Option<JointIndex> {
        LEAF_FALLBACKS
            .iter()
            .find(|(leaf, _)| *leaf == joint)
            .map(|(_, parent)| *parent)
    }
}

/// Kinect v2 joints → Mixamo bone names (without the rig prefix).
const KINECT_V2_MIXAMO: [(JointIndex, &str); 19] = [
    (kinect_v2::SPINE_BASE, "Hips"),
    (kinect_v2::SPINE_MID, "Spine"),
    (kinect_v2::SPINE_SHOULDER, "Spine1"),
    (kinect_v2::NECK, "Neck"),
    (kinect_v2::HEAD, "Head"),
    (kinect_v2::SHOULDER_LEFT, "LeftShoulder"),
    (kinect_v2::ELBOW_LEFT, "LeftArm"),
    (kinect_v2::WRIST_LEFT, "LeftForeArm"),
    (kinect_v2::HAND_LEFT, "LeftHand"),
    (kinect_v2::SHOULDER_RIGHT, "RightShoulder"),
    (kinect_v2::ELBOW_RIGHT, "RightArm"),
    (kinect_v2::WRIST_RIGHT, "RightForeArm"),
    (kinect_v2::HAND_RIGHT, "RightHand"),
    (kinect_v2::HIP_LEFT, "LeftUpLeg"),
    (kinect_v2::KNEE_LEFT, "LeftLeg"),
    (kinect_v2::ANKLE_LEFT, "LeftFoot"),
    (kinect_v2::HIP_RIGHT, "RightUpLeg"),
    (kinect_v2::KNEE_RIGHT, "RightLeg"),
    (kinect_v2::ANKLE_RIGHT, "RightFoot"),
];

/// Bindings from a Kinect v2 body to a Mixamo rig whose bones are named
/// `{prefix}{Bone}` (e.g. `mixamorig:` or `mixamorig6`). Corrections are
/// identity; leaf joints fall back per [`kinect_v2::LEAF_FALLBACKS`].
pub fn kinect_v2_mixamo(prefix: &str) -> Vec<JointBoneBinding> {
    KINECT_V2_MIXAMO
        .iter()
        .map(|(joint, bone)| {
            let binding = JointBoneBinding::new(*joint, format!("{prefix}{bone}"));
            match kinect_v2::leaf_fallback(*joint) {
                Some(fb) => binding.with_fallback(fb),
                None => binding,
            }
        })
        .collect()
}
