//! Per-tick exponential smoothing of local orientations.
//!
//! A fixed slerp factor is applied once per tick; it is not normalized by
//! elapsed time and assumes a roughly constant tick rate.

use nalgebra::UnitQuaternion;

use crate::math;

#[derive(Clone, Copy, Debug)]
pub struct Smoother {
    blend_factor: f32,
}

impl Smoother {
    /// `blend_factor` must lie in `(0, 1]`; `RetargetConfig::validate` enforces it.
    pub fn new(blend_factor: f32) -> Self {
        Self { blend_factor }
    }

    pub fn blend_factor(&self) -> f32 {
        self.blend_factor
    }

    #[inline]
    pub fn smooth(
        &self,
        current: &UnitQuaternion<f32>,
        target: &UnitQuaternion<f32>,
    ) -> UnitQuaternion<f32> {
        let mut out = math::slerp(current, target, self.blend_factor);
        out.renormalize();
        out
    }
}
