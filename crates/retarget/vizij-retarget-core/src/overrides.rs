//! Manual per-bone pose overrides.
//!
//! Overrides are written to the sink after the retarget pass and never feed
//! back into the engine's filters, so a tuning panel can pin a bone without
//! disturbing flip detection or smoothing. Clearing an override hands the bone
//! back to the retargeted pose on the next tick.

use std::collections::BTreeMap;

use nalgebra::UnitQuaternion;

use crate::ids::BoneId;
use crate::math::{self, Quat};

#[derive(Clone, Debug, Default)]
pub struct PoseOverrides {
    bones: BTreeMap<BoneId, UnitQuaternion<f32>>,
}

impl PoseOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `bone` to a local orientation. Degenerate quaternions are ignored
    /// and reported with `false`.
    pub fn set(&mut self, bone: impl Into<BoneId>, local: Quat) -> bool {
        match math::to_unit(local) {
            Some(q) => {
                self.bones.insert(bone.into(), q);
                true
            }
            None => false,
        }
    }

    /// Pin `bone` from intrinsic XYZ Euler angles in radians.
    pub fn set_euler(&mut self, bone: impl Into<BoneId>, radians: [f32; 3]) {
        self.bones.insert(bone.into(), math::from_euler_xyz(radians));
    }

    pub fn remove(&mut self, bone: &str) -> Option<Quat> {
        self.bones.remove(bone).map(|q| math::from_unit(&q))
    }

    pub fn clear(&mut self) {
        self.bones.clear();
    }

    pub fn get(&self, bone: &str) -> Option<Quat> {
        self.bones.get(bone).map(math::from_unit)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Quat)> + '_ {
        self.bones
            .iter()
            .map(|(id, q)| (id.as_str(), math::from_unit(q)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{about_y, angle_between_quats, from_unit};

    #[test]
    fn set_rejects_degenerate_and_euler_round_trips() {
        let mut o = PoseOverrides::new();
        assert!(!o.set("Head", [0.0; 4]));
        assert!(o.is_empty());

        o.set_euler("Head", [0.0, 0.5, 0.0]);
        let q = o.get("Head").unwrap();
        assert!(angle_between_quats(q, from_unit(&about_y(0.5))) < 1e-5);

        assert!(o.remove("Head").is_some());
        assert!(o.get("Head").is_none());
    }
}
