use bevy::prelude::*;
use vizij_retarget_core::BonePoseSink;

use crate::resources::RigIndex;

fn to_core(q: Quat) -> [f32; 4] {
    q.to_array()
}

fn from_core(q: [f32; 4]) -> Option<Quat> {
    let q = Quat::from_array(q);
    if !q.is_finite() || q.length_squared() <= 1e-12 {
        return None;
    }
    Some(q.normalize())
}

/// [`BonePoseSink`] over the `Transform`s of an indexed rig.
///
/// World orientations are rig-space: local rotations composed up to the
/// topmost indexed bone. Whatever sits above the rig is ignored, so the
/// avatar can be placed freely in the scene.
pub struct TransformSink<'a, 'w, 's, 't> {
    index: &'a RigIndex,
    transforms: &'a mut Query<'w, 's, &'t mut Transform>,
}

impl<'a, 'w, 's, 't> TransformSink<'a, 'w, 's, 't> {
    pub fn new(index: &'a RigIndex, transforms: &'a mut Query<'w, 's, &'t mut Transform>) -> Self {
        Self { index, transforms }
    }

    fn rotation(&self, bone: &str) -> Option<Quat> {
        let entity = *self.index.by_name.get(bone)?;
        self.transforms.get(entity).ok().map(|tf| tf.rotation)
    }
}

impl BonePoseSink for TransformSink<'_, '_, '_, '_> {
    fn contains(&self, bone: &str) -> bool {
        self.index.by_name.contains_key(bone)
    }

    fn parent(&self, bone: &str) -> Option<&str> {
        self.index.parents.get(bone).map(String::as_str)
    }

    fn world_orientation(&self, bone: &str) -> Option<[f32; 4]> {
        let mut world = self.rotation(bone)?;
        let mut cur = bone;
        // Bounded by the index size in case of a malformed parent map.
        for _ in 0..self.index.parents.len() {
            let Some(parent) = self.parent(cur) else {
                break;
            };
            world = self.rotation(parent)? * world;
            cur = parent;
        }
        Some(to_core(world.normalize()))
    }

    fn local_orientation(&self, bone: &str) -> Option<[f32; 4]> {
        self.rotation(bone).map(to_core)
    }

    fn set_local_orientation(&mut self, bone: &str, local: [f32; 4]) {
        let (Some(&entity), Some(rotation)) = (self.index.by_name.get(bone), from_core(local)) else {
            return;
        };
        if let Ok(mut tf) = self.transforms.get_mut(entity) {
            tf.rotation = rotation;
        }
    }
}
