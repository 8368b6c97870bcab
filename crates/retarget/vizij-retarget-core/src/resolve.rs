//! Source orientation resolution with leaf-joint fallback.

use hashbrown::HashMap;
use nalgebra::UnitQuaternion;

use crate::binding::{BoundJoint, JointBindingTable};
use crate::errors::SkipReason;
use crate::frame::{Joint, SkeletonFrame, TrackingState};
use crate::ids::BoneId;
use crate::math::{self, Quat};

/// Picks the effective source orientation for each binding.
#[derive(Clone, Copy, Debug, Default)]
pub struct Resolver {
    require_tracked: bool,
}

impl Resolver {
    pub fn new(require_tracked: bool) -> Self {
        Self { require_tracked }
    }

    fn usable(&self, joint: &Joint) -> Result<UnitQuaternion<f32>, SkipReason> {
        if self.require_tracked && joint.tracking_state == TrackingState::NotTracked {
            return Err(SkipReason::NotTracked(joint.index));
        }
        math::to_unit(joint.orientation).ok_or(SkipReason::DegenerateOrientation(joint.index))
    }

    /// Orientation for one binding, substituting the fallback joint when the
    /// primary joint has no usable orientation. An absent primary joint skips
    /// the binding outright.
    pub fn resolve(
        &self,
        frame: &SkeletonFrame,
        binding: &BoundJoint,
    ) -> Result<UnitQuaternion<f32>, SkipReason> {
        let primary = frame
            .get(binding.joint)
            .ok_or(SkipReason::MissingJoint(binding.joint))?;
        match self.usable(primary) {
            Ok(q) => Ok(q),
            Err(reason) => match binding.fallback {
                Some(fb) => {
                    let joint = frame.get(fb).ok_or(SkipReason::MissingJoint(fb))?;
                    self.usable(joint)
                }
                None => Err(reason),
            },
        }
    }

    /// Resolve every binding of `table`; bindings that fail are left out.
    pub fn resolve_frame(
        &self,
        frame: &SkeletonFrame,
        table: &JointBindingTable,
    ) -> HashMap<BoneId, Quat> {
        table
            .iter()
            .filter_map(|b| {
                self.resolve(frame, b)
                    .ok()
                    .map(|q| (b.bone.clone(), math::from_unit(&q)))
            })
            .collect()
    }
}
