//! Convexity restore and conservative inflation of reduced shells

use ucxcrate_core::{Mesh, Point3d, Result};
use ucxcrate_hull::{build_convex_hull, face_planes};

/// Closed convex shell over the surviving vertices of a reduction.
pub fn restore_convexity(points: &[Point3d]) -> Result<Mesh> {
    Ok(build_convex_hull(points)?.mesh)
}

/// Uniformly scale a convex shell about its vertex centroid by the smallest
/// factor `s >= 1` that puts every one of `points` on or inside it.
///
/// Returns the scaled shell and `s`.
pub fn inflate_to_cover(hull: &Mesh, points: &[Point3d]) -> (Mesh, f64) {
    let center = hull.centroid();
    let planes = face_planes(hull);

    let mut scale = 1.0f64;
    for plane in &planes {
        let gap = plane.signed_distance(&center).abs();
        if gap <= f64::EPSILON {
            continue;
        }
        for p in points {
            let reach = plane.normal.dot(&(p - center));
            scale = scale.max(reach / gap);
        }
    }

    if scale <= 1.0 {
        return (hull.clone(), 1.0);
    }

    let vertices = hull
        .vertices
        .iter()
        .map(|v| center + (v - center) * scale)
        .collect();
    (Mesh::from_vertices_and_faces(vertices, hull.faces.clone()), scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ucxcrate_hull::contains_point;

    fn octahedron(radius: f64) -> Vec<Point3d> {
        vec![
            Point3d::new(radius, 0.0, 0.0),
            Point3d::new(-radius, 0.0, 0.0),
            Point3d::new(0.0, radius, 0.0),
            Point3d::new(0.0, -radius, 0.0),
            Point3d::new(0.0, 0.0, radius),
            Point3d::new(0.0, 0.0, -radius),
        ]
    }

    #[test]
    fn test_restore_drops_interior_points() {
        let mut points = octahedron(1.0);
        points.push(Point3d::origin());
        let mesh = restore_convexity(&points).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert!(mesh.is_closed());
    }

    #[test]
    fn test_contained_points_leave_hull_untouched() {
        let hull = restore_convexity(&octahedron(1.0)).unwrap();
        let (mesh, scale) = inflate_to_cover(&hull, &[Point3d::new(0.1, 0.1, 0.1)]);
        assert_relative_eq!(scale, 1.0);
        assert_eq!(mesh, hull);
    }

    #[test]
    fn test_inflation_reaches_outside_point() {
        let hull = restore_convexity(&octahedron(1.0)).unwrap();
        let outside = Point3d::new(1.0, 1.0, 1.0);
        let (mesh, scale) = inflate_to_cover(&hull, &[outside]);
        // Face x+y+z=1 must move out to x+y+z=3
        assert_relative_eq!(scale, 3.0, epsilon = 1e-12);
        assert!(contains_point(&mesh, &outside, 1e-9));
        assert_relative_eq!(mesh.volume(), hull.volume() * 27.0, epsilon = 1e-9);
    }
}
