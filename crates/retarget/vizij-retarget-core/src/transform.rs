//! Candidate world orientation from a resolved source orientation.
//!
//! One composition for every bone:
//!
//! ```text
//! world = G × raw × correction × M
//! ```
//!
//! `G` is the global calibration (`floor_tilt × axis_remap`) under
//! [`CompositionOrder::PreMultiplyGlobalThenRaw`] and identity under
//! [`CompositionOrder::RawThenCorrection`]. `M` is the mirror term, a 180°
//! turn about Y when mirroring is enabled.

use std::f32::consts::{FRAC_PI_2, PI};

use nalgebra::{UnitQuaternion, Vector3};

use crate::config::{Calibration, CompositionOrder, RetargetConfig};
use crate::math::{self, Quat, IDENTITY};

/// Precomputed global terms of the composition.
#[derive(Clone, Copy, Debug)]
pub struct RetargetTransform {
    global: UnitQuaternion<f32>,
    mirror: UnitQuaternion<f32>,
}

impl RetargetTransform {
    pub fn new(order: CompositionOrder, calibration: &Calibration) -> Self {
        let global = match order {
            CompositionOrder::PreMultiplyGlobalThenRaw => {
                let tilt = math::to_unit(calibration.floor_tilt).unwrap_or_else(UnitQuaternion::identity);
                let remap = if calibration.axis_remap {
                    math::about_x(-FRAC_PI_2)
                } else {
                    UnitQuaternion::identity()
                };
                tilt * remap
            }
            CompositionOrder::RawThenCorrection => UnitQuaternion::identity(),
        };
        let mirror = if calibration.mirror {
            math::about_y(PI)
        } else {
            UnitQuaternion::identity()
        };
        Self { global, mirror }
    }

    pub fn from_config(cfg: &RetargetConfig) -> Self {
        Self::new(cfg.composition, &cfg.calibration)
    }

    /// Candidate world orientation for one bone.
    #[inline]
    pub fn apply(
        &self,
        resolved: &UnitQuaternion<f32>,
        correction: &UnitQuaternion<f32>,
    ) -> UnitQuaternion<f32> {
        let mut world = self.global * resolved * correction * self.mirror;
        world.renormalize();
        world
    }
}

/// Floor tilt compensation from a Kinect style floor clip plane `(x, y, z, w)`:
/// the rotation carrying the plane normal onto +Y. Level floors, degenerate or
/// upside-down normals yield identity.
pub fn floor_tilt_from_clip_plane(plane: [f32; 4]) -> Quat {
    let normal = Vector3::new(plane[0], plane[1], plane[2]);
    if !normal.iter().all(|c| c.is_finite()) || normal.norm() <= 1e-6 {
        return IDENTITY;
    }
    UnitQuaternion::rotation_between(&normal, &Vector3::y())
        .map(|q| math::from_unit(&q))
        .unwrap_or(IDENTITY)
}
