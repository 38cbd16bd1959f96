//! Conversions between the simulation's nalgebra types and Bevy's glam types.

use bevy::prelude::*;
use shared::Rgba;
use nalgebra::{Point3, UnitQuaternion, Vector3};

pub fn to_vec3(p: &Point3<f32>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

pub fn vec_to_vec3(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_point(v: Vec3) -> Point3<f32> {
    Point3::new(v.x, v.y, v.z)
}

pub fn to_vector(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

pub fn to_quat(q: &UnitQuaternion<f32>) -> Quat {
    let q = q.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Tints are authored in sRGB.
pub fn to_color(c: Rgba) -> Color {
    Color::srgba(c.r, c.g, c.b, c.a)
}

/// Rotation stored as `[i, j, k, w]`.
pub fn quat_from_array([i, j, k, w]: [f32; 4]) -> Quat {
    Quat::from_xyzw(i, j, k, w).normalize()
}
