//! Quaternion helpers shared by the retarget stages.
//!
//! Public data carries rotations as `[x, y, z, w]` arrays; arithmetic goes through
//! `nalgebra::UnitQuaternion<f32>`. Conversions here are the only place the two
//! layouts meet (nalgebra constructs as `(w, i, j, k)`).

use nalgebra::{Quaternion, Unit, UnitQuaternion, Vector3};

/// Quaternion in `(x, y, z, w)` order.
pub type Quat = [f32; 4];

/// Identity rotation in `(x, y, z, w)` order.
pub const IDENTITY: Quat = [0.0, 0.0, 0.0, 1.0];

/// Norm below which a quaternion carries no usable rotation.
const MIN_NORM: f32 = 1e-6;

/// True when `q` carries no rotation data: the all-zero "not computed" sentinel,
/// a near-zero norm, or any non-finite component.
#[inline]
pub fn is_degenerate(q: Quat) -> bool {
    if q.iter().any(|c| !c.is_finite()) {
        return true;
    }
    length(q) <= MIN_NORM
}

#[inline]
pub fn length(q: Quat) -> f32 {
    (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt()
}

/// Convert to a unit quaternion, or `None` when `q` is degenerate.
#[inline]
pub fn to_unit(q: Quat) -> Option<UnitQuaternion<f32>> {
    if is_degenerate(q) {
        return None;
    }
    Unit::try_new(Quaternion::new(q[3], q[0], q[1], q[2]), MIN_NORM)
}

#[inline]
pub fn from_unit(u: &UnitQuaternion<f32>) -> Quat {
    [u.i, u.j, u.k, u.w]
}

/// Re-normalize `q` to unit length, `None` when degenerate.
#[inline]
pub fn normalize(q: Quat) -> Option<Quat> {
    to_unit(q).map(|u| from_unit(&u))
}

/// Rotation angle between two orientations, in radians within `[0, π]`.
///
/// Measured on the relative rotation `a⁻¹ · b` with `|w|`, so `q` and `-q`
/// (the same rotation) measure zero. `atan2` keeps small angles accurate in
/// `f32`, where `acos` of a near-one dot product does not.
#[inline]
pub fn angle_between(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>) -> f32 {
    let rel = a.inverse() * b;
    2.0 * rel.imag().norm().atan2(rel.w.abs())
}

/// [`angle_between`] over raw arrays; degenerate inputs measure `π`.
pub fn angle_between_quats(a: Quat, b: Quat) -> f32 {
    match (to_unit(a), to_unit(b)) {
        (Some(a), Some(b)) => angle_between(&a, &b),
        _ => std::f32::consts::PI,
    }
}

/// Shortest-arc spherical interpolation from `a` (t = 0) to `b` (t = 1).
///
/// Works on the relative rotation `a⁻¹ · b` with the half angle taken by
/// `atan2`, so pairs a fraction of a milliradian apart still move by `t` of
/// their separation.
#[inline]
pub fn slerp(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>, t: f32) -> UnitQuaternion<f32> {
    let mut rel = (a.inverse() * b).into_inner();
    if rel.w < 0.0 {
        rel = -rel;
    }
    let imag = rel.imag();
    let sin_half = imag.norm();
    if sin_half == 0.0 {
        return *b;
    }
    let half = sin_half.atan2(rel.w);
    let axis = Unit::new_unchecked(imag / sin_half);
    let mut out = a * UnitQuaternion::from_axis_angle(&axis, 2.0 * half * t);
    out.renormalize();
    out
}

/// Rotation of `angle` radians about the unit X axis.
#[inline]
pub fn about_x(angle: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle)
}

/// Rotation of `angle` radians about the unit Y axis.
#[inline]
pub fn about_y(angle: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle)
}

/// Rotation from intrinsic XYZ Euler angles in radians (`Rx · Ry · Rz`), the
/// default order of three.js style rigs.
pub fn from_euler_xyz(angles: [f32; 3]) -> UnitQuaternion<f32> {
    let rx = about_x(angles[0]);
    let ry = about_y(angles[1]);
    let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles[2]);
    rx * ry * rz
}

/// [`from_euler_xyz`] with angles given in degrees.
pub fn from_euler_xyz_deg(degrees: [f32; 3]) -> UnitQuaternion<f32> {
    from_euler_xyz([
        degrees[0].to_radians(),
        degrees[1].to_radians(),
        degrees[2].to_radians(),
    ])
}
