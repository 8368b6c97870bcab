//! Engine-owned per-bone history.

use hashbrown::HashMap;
use nalgebra::UnitQuaternion;

use crate::ids::BoneId;
use crate::math::{self, Quat};

/// Last orientations the engine produced for one bone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneState {
    /// Guarded world orientation; the flip guard's prior.
    pub last_world: UnitQuaternion<f32>,
    /// Smoothed local orientation; the smoother's starting point.
    pub last_local: UnitQuaternion<f32>,
}

/// Per-bone [`BoneState`], created lazily on a bone's first resolution.
#[derive(Clone, Debug, Default)]
pub struct RetargetState {
    bones: HashMap<BoneId, BoneState>,
}

impl RetargetState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, bone: &str) -> Option<&BoneState> {
        self.bones.get(bone)
    }

    /// Store both orientations, re-normalized.
    pub fn record(
        &mut self,
        bone: &str,
        mut last_world: UnitQuaternion<f32>,
        mut last_local: UnitQuaternion<f32>,
    ) {
        last_world.renormalize();
        last_local.renormalize();
        let entry = BoneState {
            last_world,
            last_local,
        };
        match self.bones.get_mut(bone) {
            Some(slot) => *slot = entry,
            None => {
                self.bones.insert(bone.to_owned(), entry);
            }
        }
    }

    pub fn contains(&self, bone: &str) -> bool {
        self.bones.contains_key(bone)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// `(bone, last_world, last_local)` as `(x, y, z, w)` arrays.
    pub fn snapshot(&self) -> impl Iterator<Item = (&str, Quat, Quat)> + '_ {
        self.bones.iter().map(|(id, s)| {
            (
                id.as_str(),
                math::from_unit(&s.last_world),
                math::from_unit(&s.last_local),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::about_x;

    #[test]
    fn record_creates_then_overwrites() {
        let mut st = RetargetState::new();
        assert!(st.get("Head").is_none());
        st.record("Head", about_x(0.1), about_x(0.2));
        st.record("Head", about_x(0.3), about_x(0.4));
        assert_eq!(st.len(), 1);
        let local = st.get("Head").unwrap().last_local;
        assert!(math::angle_between(&local, &about_x(0.4)) < 1e-5);
        let (_, world, _) = st.snapshot().next().unwrap();
        assert!((math::length(world) - 1.0).abs() < 1e-5);
    }
}
