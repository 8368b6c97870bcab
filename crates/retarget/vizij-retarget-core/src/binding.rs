//! Joint → bone binding table.
//!
//! Each row maps one source joint to one target bone, with a static corrective
//! rotation and an optional fallback joint for leaf joints the source reports
//! without orientation. The table is immutable once built and defines the full
//! set of bones the engine drives.

use hashbrown::HashSet;
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::errors::RetargetError;
use crate::ids::{BoneId, JointIndex};
use crate::math::{self, Quat, IDENTITY};

/// Static per-bone correction, as authored in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Correction {
    /// Quaternion `(x, y, z, w)`.
    Quat(Quat),
    /// Intrinsic XYZ Euler angles in degrees.
    EulerDeg { euler_deg: [f32; 3] },
}

impl Default for Correction {
    fn default() -> Self {
        Correction::Quat(IDENTITY)
    }
}

impl Correction {
    /// Resolve to a unit rotation; `None` for a degenerate quaternion.
    pub fn to_unit(&self) -> Option<UnitQuaternion<f32>> {
        match *self {
            Correction::Quat(q) => math::to_unit(q),
            Correction::EulerDeg { euler_deg } => Some(math::from_euler_xyz_deg(euler_deg)),
        }
    }
}

/// One joint → bone row as authored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointBoneBinding {
    pub joint: JointIndex,
    pub bone: BoneId,
    #[serde(default)]
    pub correction: Correction,
    /// Joint whose orientation substitutes when `joint` has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<JointIndex>,
}

impl JointBoneBinding {
    pub fn new(joint: impl Into<JointIndex>, bone: impl Into<BoneId>) -> Self {
        Self {
            joint: joint.into(),
            bone: bone.into(),
            correction: Correction::default(),
            fallback: None,
        }
    }

    pub fn with_correction(mut self, correction: Quat) -> Self {
        self.correction = Correction::Quat(correction);
        self
    }

    pub fn with_correction_euler_deg(mut self, euler_deg: [f32; 3]) -> Self {
        self.correction = Correction::EulerDeg { euler_deg };
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<JointIndex>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

/// A validated binding row with its correction resolved to a unit rotation.
#[derive(Clone, Debug)]
pub struct BoundJoint {
    pub joint: JointIndex,
    pub bone: BoneId,
    pub correction: UnitQuaternion<f32>,
    pub fallback: Option<JointIndex>,
}

/// Immutable set of bindings, in authored order.
#[derive(Clone, Debug, Default)]
pub struct JointBindingTable {
    rows: Vec<BoundJoint>,
}

impl JointBindingTable {
    /// Validate and freeze `bindings`. A bone may be driven by at most one joint.
    pub fn new(bindings: Vec<JointBoneBinding>) -> Result<Self, RetargetError> {
        let mut seen: HashSet<BoneId> = HashSet::with_capacity(bindings.len());
        let mut rows = Vec::with_capacity(bindings.len());
        for b in bindings {
            if !seen.insert(b.bone.clone()) {
                return Err(RetargetError::DuplicateBinding { bone: b.bone });
            }
            let correction = b.correction.to_unit().ok_or_else(|| RetargetError::InvalidConfig {
                reason: format!("bone '{}' has a degenerate correction quaternion", b.bone),
            })?;
            rows.push(BoundJoint {
                joint: b.joint,
                bone: b.bone,
                correction,
                fallback: b.fallback,
            });
        }
        Ok(Self { rows })
    }

    pub fn from_json_str(json: &str) -> Result<Self, RetargetError> {
        let bindings: Vec<JointBoneBinding> = serde_json::from_str(json)?;
        Self::new(bindings)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundJoint> {
        self.rows.iter()
    }

    pub fn get(&self, bone: &str) -> Option<&BoundJoint> {
        self.rows.iter().find(|r| r.bone == bone)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
