//! Oriented bounding box proxies

use serde::{Deserialize, Serialize};
use ucxcrate_core::{
    is_finite_point, Bounded, Error, Mesh, Point3d, Result, Transform3D, Vector3d,
};

/// Outward quads over corners indexed by `x | y << 1 | z << 2` (bit set = max side)
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 2, 3, 1], // -z
    [4, 5, 7, 6], // +z
    [0, 1, 5, 4], // -y
    [2, 6, 7, 3], // +y
    [0, 4, 6, 2], // -x
    [1, 3, 7, 5], // +x
];

/// Axis-aligned box in some frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    /// Tight box around `points`, or `None` when there are none
    pub fn from_points(points: &[Point3d]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let (min, max) = points.bounding_box();
        Some(Self { min, max })
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3d {
        self.max - self.min
    }

    /// Geometric center (also the center of mass of the solid box)
    pub fn center(&self) -> Point3d {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Grow by `padding` on both sides of each axis
    pub fn expanded(&self, padding: &Vector3d) -> Self {
        Self {
            min: self.min - padding,
            max: self.max + padding,
        }
    }

    /// The eight corners, bit `i` of the index selecting the max side of axis `i`
    pub fn corners(&self) -> [Point3d; 8] {
        std::array::from_fn(|i| {
            Point3d::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Closed 8-vertex, 6-quad mesh of the box, wound outward
    pub fn to_mesh(&self) -> Mesh {
        Mesh::from_vertices_and_faces(
            self.corners().to_vec(),
            BOX_FACES.iter().map(|f| f.to_vec()).collect(),
        )
    }
}

/// Build a box proxy around `points` given in the source's local space.
///
/// Extents are taken along the source's own axes, padded by `offset`
/// (world units) on both sides of every axis when `apply_offset` is set,
/// and the box is returned in world space through `local_transform`.
/// A flat source yields a zero-thickness box rather than an error.
///
/// # Errors
///
/// * [`Error::InsufficientInput`] for an empty point set
/// * [`Error::InvalidConfiguration`] for a negative or non-finite offset
/// * [`Error::InvalidData`] for non-finite points, or a transform that
///   collapses an axis while an offset is requested
///
/// # Example
///
/// ```rust
/// use ucxcrate_core::{Point3d, Transform3D};
/// use ucxcrate_hull::build_bounding_box;
///
/// let points = vec![Point3d::new(-1.0, -1.0, -1.0), Point3d::new(1.0, 1.0, 1.0)];
/// let mesh = build_bounding_box(&points, &Transform3D::identity(), 0.5, true).unwrap();
/// assert_eq!(mesh.vertex_count(), 8);
/// assert!((mesh.volume() - 27.0).abs() < 1e-9);
/// ```
pub fn build_bounding_box(
    points: &[Point3d],
    local_transform: &Transform3D,
    offset: f64,
    apply_offset: bool,
) -> Result<Mesh> {
    let bounds = local_bounds(points)?;
    let offset = if apply_offset { offset } else { 0.0 };
    if !offset.is_finite() || offset < 0.0 {
        return Err(Error::invalid_config(format!(
            "bounding box offset must be finite and non-negative, got {}",
            offset
        )));
    }

    let padding = if offset > 0.0 {
        let scales = local_transform.axis_scales();
        if scales.iter().any(|&s| s <= f64::EPSILON) {
            return Err(Error::invalid_data(
                "source transform collapses an axis; cannot convert the offset",
            ));
        }
        scales.map(|s| offset / s)
    } else {
        Vector3d::zeros()
    };

    Ok(bounds.expanded(&padding).to_mesh().transformed(local_transform))
}

fn local_bounds(points: &[Point3d]) -> Result<BoundingBox> {
    if let Some(i) = points.iter().position(|p| !is_finite_point(p)) {
        return Err(Error::invalid_data(format!(
            "point {} has non-finite coordinates",
            i
        )));
    }
    BoundingBox::from_points(points).ok_or(Error::InsufficientInput {
        required: 1,
        found: 0,
    })
}
