use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::constants::DIST_EPS;

/// Project onto the horizontal (XZ) plane and normalize.
///
/// Returns zero if nothing is left after dropping the vertical component.
pub fn to_planar_unit(v: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(v.x, 0.0, v.z)
        .try_normalize(DIST_EPS)
        .unwrap_or_else(Vector3::zeros)
}

/// Normalize, or zero for (near) zero-length input.
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(DIST_EPS).unwrap_or_else(Vector3::zeros)
}

/// Linear interpolation between two points, `t` clamped to `[0, 1]`.
pub fn lerp_point(from: &Point3<f32>, to: &Point3<f32>, t: f32) -> Point3<f32> {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Rotation whose local +Z faces `dir`, with +Y kept up.
///
/// Returns `None` for a zero or vertical direction.
pub fn facing_rotation(dir: &Vector3<f32>) -> Option<UnitQuaternion<f32>> {
    let planar = to_planar_unit(*dir);
    if planar == Vector3::zeros() {
        return None;
    }
    Some(UnitQuaternion::face_towards(&planar, &Vector3::y()))
}

/// Spherical interpolation, `t` clamped to `[0, 1]`.
///
/// Snaps to `to` when no unique arc exists.
pub fn slerp_clamped(
    from: &UnitQuaternion<f32>,
    to: &UnitQuaternion<f32>,
    t: f32,
) -> UnitQuaternion<f32> {
    from.try_slerp(to, t.clamp(0.0, 1.0), 1.0e-6)
        .unwrap_or(*to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn planar_unit_drops_vertical_component() {
        let v = to_planar_unit(Vector3::new(3.0, 10.0, 4.0));
        assert_relative_eq!(v, Vector3::new(0.6, 0.0, 0.8), epsilon = 1.0e-6);
        assert_eq!(to_planar_unit(Vector3::new(0.0, -1.0, 0.0)), Vector3::zeros());
    }

    #[test]
    fn lerp_clamps_factor() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(8.0, 0.0, 0.0);
        assert_relative_eq!(lerp_point(&a, &b, 0.125).x, 1.0);
        assert_relative_eq!(lerp_point(&a, &b, 2.0).x, 8.0);
    }

    #[test]
    fn facing_rotation_maps_local_forward_onto_direction() {
        let dir = Vector3::new(1.0, 0.0, 0.0);
        let rot = facing_rotation(&dir).unwrap();
        assert_relative_eq!(rot * Vector3::z(), dir, epsilon = 1.0e-6);
        assert!(facing_rotation(&Vector3::y()).is_none());
    }

    #[test]
    fn slerp_moves_partway_and_clamps() {
        let a = UnitQuaternion::identity();
        let b = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2);
        let half = slerp_clamped(&a, &b, 0.5);
        assert_relative_eq!(half.angle(), std::f32::consts::FRAC_PI_4, epsilon = 1.0e-5);

        let past_end = slerp_clamped(&a, &b, 3.0);
        assert_relative_eq!(past_end.angle_to(&b), 0.0, epsilon = 1.0e-4);
    }
}
