//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Returns true if every coordinate of the point is finite
#[inline]
pub fn is_finite_point(p: &Point3d) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}

/// Arithmetic mean of a set of points, or `None` for an empty slice
pub fn mean_point(points: &[Point3d]) -> Option<Point3d> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3d::zeros(), |acc, p| acc + p.coords);
    Some(Point3d::from(sum / points.len() as f64))
}

/// Unnormalized normal of the triangle (a, b, c) following the right-hand rule
#[inline]
pub fn triangle_normal(a: &Point3d, b: &Point3d, c: &Point3d) -> Vector3d {
    (b - a).cross(&(c - a))
}
