//! Convexity and containment checks for closed shells

use ucxcrate_core::{Mesh, Point3d, Vector3d};

/// Supporting plane of a face: `normal · x = offset`, unit outward normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePlane {
    pub normal: Vector3d,
    pub offset: f64,
}

impl FacePlane {
    /// Signed distance, positive outside
    #[inline]
    pub fn signed_distance(&self, point: &Point3d) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }
}

/// Faces whose normal length falls below this fraction of their longest
/// squared edge are slivers; their planes are numerically unreliable.
const SLIVER_RATIO: f64 = 1e-10;

/// Supporting plane of each face, `None` for slivers and collapsed faces
pub fn supporting_planes(mesh: &Mesh) -> Vec<Option<FacePlane>> {
    mesh.face_normals()
        .into_iter()
        .zip(&mesh.faces)
        .map(|(n, face)| {
            let longest = face
                .iter()
                .zip(face.iter().cycle().skip(1))
                .map(|(&a, &b)| (mesh.vertices[b] - mesh.vertices[a]).norm_squared())
                .fold(0.0, f64::max);
            let length = n.norm();
            (length > f64::MIN_POSITIVE && length > longest * SLIVER_RATIO).then(|| {
                let normal = n / length;
                FacePlane {
                    normal,
                    offset: normal.dot(&mesh.vertices[face[0]].coords),
                }
            })
        })
        .collect()
}

/// Supporting planes of every non-degenerate face
pub fn face_planes(mesh: &Mesh) -> Vec<FacePlane> {
    supporting_planes(mesh).into_iter().flatten().collect()
}

/// Every vertex lies on or behind every face plane, within `tolerance`
pub fn is_convex(mesh: &Mesh, tolerance: f64) -> bool {
    let planes = face_planes(mesh);
    mesh.vertices
        .iter()
        .all(|v| planes.iter().all(|p| p.signed_distance(v) <= tolerance))
}

/// Whether a convex closed mesh contains `point`, within `tolerance`
pub fn contains_point(mesh: &Mesh, point: &Point3d, tolerance: f64) -> bool {
    face_planes(mesh)
        .iter()
        .all(|p| p.signed_distance(point) <= tolerance)
}

/// Largest distance by which any of `points` pokes out of a convex mesh.
/// Zero or negative when all points are contained.
pub fn max_outside_distance(mesh: &Mesh, points: &[Point3d]) -> f64 {
    let planes = face_planes(mesh);
    points
        .iter()
        .map(|p| {
            planes
                .iter()
                .map(|plane| plane.signed_distance(p))
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .fold(f64::NEG_INFINITY, f64::max)
}
