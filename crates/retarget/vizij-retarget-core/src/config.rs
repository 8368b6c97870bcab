//! Construction-time configuration for the retarget engine.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::errors::RetargetError;
use crate::math::{Quat, IDENTITY};

/// How a bone's correction combines with the raw tracked orientation.
///
/// Both variants go through the same composition (see `transform`); the
/// variant only selects whether the global calibration term participates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositionOrder {
    /// `world = floor_tilt × axis_remap × raw × correction × mirror`
    #[default]
    PreMultiplyGlobalThenRaw,
    /// `world = raw × correction × mirror`
    RawThenCorrection,
}

/// Global calibration applied uniformly to every bone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Remap the source's axes with a −90° rotation about X.
    #[serde(default)]
    pub axis_remap: bool,
    /// Mirror the performer by appending a 180° rotation about Y.
    #[serde(default)]
    pub mirror: bool,
    /// Floor tilt compensation `(x, y, z, w)`; identity when the floor is level.
    #[serde(default = "identity_quat")]
    pub floor_tilt: Quat,
}

fn identity_quat() -> Quat {
    IDENTITY
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            axis_remap: false,
            mirror: false,
            floor_tilt: IDENTITY,
        }
    }
}

fn default_blend_factor() -> f32 {
    0.4
}
fn default_flip_threshold() -> f32 {
    0.9 * PI
}
fn default_flip_damping() -> f32 {
    0.5
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetargetConfig {
    #[serde(default)]
    pub composition: CompositionOrder,
    #[serde(default)]
    pub calibration: Calibration,
    /// Per-tick slerp factor toward the target local orientation, in `(0, 1]`.
    #[serde(default = "default_blend_factor")]
    pub blend_factor: f32,
    /// Angular jump (radians) above which a new orientation counts as a flip.
    #[serde(default = "default_flip_threshold")]
    pub flip_threshold: f32,
    /// How far a flipped candidate is pulled back toward the prior, in `[0, 1]`.
    #[serde(default = "default_flip_damping")]
    pub flip_damping: f32,
    /// Treat `NotTracked` joints as missing.
    #[serde(default)]
    pub require_tracked: bool,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            composition: CompositionOrder::default(),
            calibration: Calibration::default(),
            blend_factor: default_blend_factor(),
            flip_threshold: default_flip_threshold(),
            flip_damping: default_flip_damping(),
            require_tracked: false,
        }
    }
}

impl RetargetConfig {
    pub fn validate(&self) -> Result<(), RetargetError> {
        if !(self.blend_factor > 0.0 && self.blend_factor <= 1.0) {
            return Err(RetargetError::InvalidConfig {
                reason: format!("blend_factor {} is outside (0, 1]", self.blend_factor),
            });
        }
        if !self.flip_threshold.is_finite() || self.flip_threshold < 0.0 {
            return Err(RetargetError::InvalidConfig {
                reason: format!("flip_threshold {} is not a non-negative angle", self.flip_threshold),
            });
        }
        if !(0.0..=1.0).contains(&self.flip_damping) {
            return Err(RetargetError::InvalidConfig {
                reason: format!("flip_damping {} is outside [0, 1]", self.flip_damping),
            });
        }
        if crate::math::is_degenerate(self.calibration.floor_tilt) {
            return Err(RetargetError::InvalidConfig {
                reason: "calibration floor_tilt is degenerate".into(),
            });
        }
        Ok(())
    }
}
