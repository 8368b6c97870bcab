//! World → parent-relative conversion.

use nalgebra::UnitQuaternion;

/// `local = inverse(parent_world) × world`; a root bone's local is its world.
#[inline]
pub fn localize(
    parent_world: Option<&UnitQuaternion<f32>>,
    world: &UnitQuaternion<f32>,
) -> UnitQuaternion<f32> {
    match parent_world {
        Some(parent) => {
            let mut local = parent.inverse() * world;
            local.renormalize();
            local
        }
        None => *world,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{about_x, about_y, angle_between};

    #[test]
    fn root_local_equals_world() {
        let w = about_y(0.7);
        assert_eq!(localize(None, &w), w);
    }

    #[test]
    fn parent_times_local_recovers_world() {
        let parent = about_x(0.4) * about_y(-1.1);
        let world = about_y(0.9) * about_x(2.0);
        let local = localize(Some(&parent), &world);
        assert!(angle_between(&(parent * local), &world) < 1e-5);
    }
}
