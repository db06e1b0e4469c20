//! Point arithmetic and Euler-angle helpers shared by the box model.

use crate::types::{Point, Rotations};
use nalgebra as na;

const GIMBAL_EPSILON: f64 = 1e-6;

pub fn translate_point(point: &Point, dx: f64, dy: f64, dz: f64) -> Point {
    point + na::Vector3::new(dx, dy, dz)
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Rotation applying the x angle first, then y, then z (extrinsic), which is
/// the intrinsic Z-Y-X order used by the renderer.
pub fn rotation_from_degrees(rotation: Rotations) -> na::Rotation3<f64> {
    let [x, y, z] = rotation.to_array().map(|a| normalize_degrees(a).to_radians());
    na::Rotation3::from_euler_angles(x, y, z)
}

pub fn rotate_point_around_center(point: &Point, center: &Point, rotation: Rotations) -> Point {
    center + rotation_from_degrees(rotation) * (point - center)
}

pub fn euclidean_sq_distance(a: &Point, b: &Point) -> f64 {
    na::distance_squared(a, b)
}

pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point>) -> Point {
    let (sum, count) = points
        .into_iter()
        .fold((na::Vector3::zeros(), 0usize), |(sum, n), p| {
            (sum + p.coords, n + 1)
        });
    if count == 0 {
        Point::origin()
    } else {
        Point::from(sum / count as f64)
    }
}

/// Decompose an orthonormal rotation matrix into x/y/z angles in degrees.
///
/// Inverse of [`rotation_from_degrees`] up to the usual Euler ambiguity. At
/// gimbal lock (`|cos(pitch)| ~ 0`) the x angle is pinned to zero.
pub fn rotation_matrix_to_euler(r: &na::Matrix3<f64>) -> Rotations {
    let pitch = -r[(2, 0)].clamp(-1.0, 1.0).asin();
    let cos_pitch = pitch.cos();

    let (roll, yaw) = if cos_pitch.abs() < GIMBAL_EPSILON {
        (0.0, (-r[(0, 1)]).atan2(r[(1, 1)]))
    } else {
        (
            (r[(2, 1)] / cos_pitch).atan2(r[(2, 2)] / cos_pitch),
            (r[(1, 0)] / cos_pitch).atan2(r[(0, 0)] / cos_pitch),
        )
    };

    Rotations::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
}
