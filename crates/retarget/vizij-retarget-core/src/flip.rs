//! Damping of near-180° orientation discontinuities between ticks.
//!
//! Depth trackers occasionally report a joint turned almost half a revolution
//! from one frame to the next. Such jumps are treated as tracker noise: the
//! candidate is slerped part of the way back toward the previous orientation
//! instead of being accepted outright.

use nalgebra::UnitQuaternion;

use crate::config::RetargetConfig;
use crate::math;

/// Result of guarding one candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Guarded {
    pub orientation: UnitQuaternion<f32>,
    /// Angle between prior and raw candidate; zero on first observation.
    pub jump: f32,
    pub damped: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct FlipGuard {
    threshold: f32,
    damping: f32,
}

impl Default for FlipGuard {
    fn default() -> Self {
        Self::from_config(&RetargetConfig::default())
    }
}

impl FlipGuard {
    pub fn new(threshold: f32, damping: f32) -> Self {
        Self { threshold, damping }
    }

    pub fn from_config(cfg: &RetargetConfig) -> Self {
        Self::new(cfg.flip_threshold, cfg.flip_damping)
    }

    /// Guard `candidate` against the bone's prior world orientation.
    ///
    /// With no prior the candidate passes through unchanged. The caller stores
    /// the returned orientation as the next prior.
    pub fn guard(
        &self,
        prior: Option<&UnitQuaternion<f32>>,
        candidate: UnitQuaternion<f32>,
    ) -> Guarded {
        let Some(prior) = prior else {
            return Guarded {
                orientation: candidate,
                jump: 0.0,
                damped: false,
            };
        };
        let jump = math::angle_between(prior, &candidate);
        if jump > self.threshold {
            Guarded {
                orientation: math::slerp(&candidate, prior, self.damping),
                jump,
                damped: true,
            }
        } else {
            Guarded {
                orientation: candidate,
                jump,
                damped: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{about_x, about_y, angle_between};

    #[test]
    fn first_observation_passes_through() {
        let g = FlipGuard::default();
        let c = about_y(3.0);
        let out = g.guard(None, c);
        assert!(!out.damped);
        assert_eq!(out.orientation, c);
    }

    #[test]
    fn negated_candidate_is_not_a_flip() {
        let g = FlipGuard::default();
        let prior = about_x(0.6);
        let negated = UnitQuaternion::new_unchecked(-prior.into_inner());
        let out = g.guard(Some(&prior), negated);
        assert!(!out.damped);
        assert!(out.jump < 1e-3);
    }

    #[test]
    fn heavy_flip_is_halved() {
        let g = FlipGuard::default();
        let prior = about_y(0.2);
        let raw = about_y(0.2) * about_x(170f32.to_radians());
        let out = g.guard(Some(&prior), raw);
        assert!(out.damped);
        assert!((out.jump - 170f32.to_radians()).abs() < 1e-3);
        let remaining = angle_between(&prior, &out.orientation);
        assert!((remaining - 85f32.to_radians()).abs() < 1e-3);
    }

    #[test]
    fn moderate_motion_is_accepted() {
        let g = FlipGuard::default();
        let prior = UnitQuaternion::identity();
        let raw = about_x(120f32.to_radians());
        let out = g.guard(Some(&prior), raw);
        assert!(!out.damped);
        assert_eq!(out.orientation, raw);
    }
}
