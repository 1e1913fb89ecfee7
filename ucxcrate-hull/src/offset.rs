//! Outward offset (thickening) of closed convex shells

use serde::{Deserialize, Serialize};
use tracing::debug;
use ucxcrate_core::{Error, Mesh, Point3d, Result, Vector3d};

use crate::quickhull::{build_convex_hull_with, HullParams};

/// Method for moving the shell outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OffsetMethod {
    /// Copy every vertex once per incident face, displaced along that
    /// face's normal, then re-hull.
    ///
    /// Every face plane moves out by exactly the margin and the result
    /// strictly contains the input. Edges and corners come out bevelled.
    #[default]
    FaceCopies,

    /// Move each vertex along the average of its incident face normals,
    /// stretched so no incident face moves by less than the margin, then
    /// re-hull. Keeps the vertex count of the input.
    VertexNormal,
}

impl std::fmt::Display for OffsetMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FaceCopies => write!(f, "face-copies"),
            Self::VertexNormal => write!(f, "vertex-normal"),
        }
    }
}

/// Parameters for offsetting a shell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetParams {
    /// Outward distance, in the mesh's units
    pub margin: f64,
    pub method: OffsetMethod,
    /// Parameters for the convex hull that restores convexity
    pub hull: HullParams,
}

impl Default for OffsetParams {
    fn default() -> Self {
        Self {
            margin: 0.0,
            method: OffsetMethod::default(),
            hull: HullParams::default(),
        }
    }
}

impl OffsetParams {
    /// Params for a given margin with the default method
    pub fn with_margin(margin: f64) -> Self {
        Self {
            margin,
            ..Default::default()
        }
    }
}

/// Grow a closed convex mesh outward by `margin` along its face normals.
///
/// A zero margin returns the input unchanged.
///
/// # Errors
///
/// * [`Error::InvalidConfiguration`] for a negative or non-finite margin
/// * [`Error::InvalidData`] when the mesh is malformed or not closed
pub fn apply_offset(mesh: &Mesh, margin: f64) -> Result<Mesh> {
    apply_offset_with(mesh, &OffsetParams::with_margin(margin))
}

/// Grow a closed convex mesh outward using explicit parameters.
pub fn apply_offset_with(mesh: &Mesh, params: &OffsetParams) -> Result<Mesh> {
    let margin = params.margin;
    if !margin.is_finite() || margin < 0.0 {
        return Err(Error::invalid_config(format!(
            "offset margin must be finite and non-negative, got {}",
            margin
        )));
    }
    if margin == 0.0 {
        return Ok(mesh.clone());
    }

    mesh.validate()?;
    if !mesh.is_closed() {
        return Err(Error::invalid_data("offset requires a closed mesh"));
    }

    let unit_normals: Vec<Option<Vector3d>> = mesh
        .face_normals()
        .into_iter()
        .map(|n| {
            let length = n.norm();
            (length > f64::MIN_POSITIVE).then(|| n / length)
        })
        .collect();

    let displaced = match params.method {
        OffsetMethod::FaceCopies => face_copies(mesh, &unit_normals, margin),
        OffsetMethod::VertexNormal => vertex_normal_shift(mesh, &unit_normals, margin),
    };

    let hull = build_convex_hull_with(&displaced, &params.hull)?;

    debug!(
        margin,
        method = %params.method,
        input_triangles = mesh.triangle_count(),
        output_triangles = hull.mesh.triangle_count(),
        "offset applied"
    );

    Ok(hull.mesh)
}

fn face_copies(mesh: &Mesh, unit_normals: &[Option<Vector3d>], margin: f64) -> Vec<Point3d> {
    let mut points = Vec::with_capacity(mesh.faces.iter().map(Vec::len).sum());
    for (face, normal) in mesh.faces.iter().zip(unit_normals) {
        let Some(normal) = normal else {
            continue;
        };
        for &v in face {
            points.push(mesh.vertices[v] + normal * margin);
        }
    }
    points
}

fn vertex_normal_shift(mesh: &Mesh, unit_normals: &[Option<Vector3d>], margin: f64) -> Vec<Point3d> {
    // Smallest cosine accepted between the averaged and a face normal
    const MIN_ALIGNMENT: f64 = 1e-3;

    let mut incident: Vec<Vec<Vector3d>> = vec![Vec::new(); mesh.vertices.len()];
    for (face, normal) in mesh.faces.iter().zip(unit_normals) {
        if let Some(normal) = normal {
            for &v in face {
                // Triangles of one flat facet count once
                if !incident[v].iter().any(|n| n.dot(normal) > 1.0 - 1e-9) {
                    incident[v].push(*normal);
                }
            }
        }
    }

    mesh.vertices
        .iter()
        .zip(&incident)
        .filter(|(_, normals)| !normals.is_empty())
        .map(|(p, normals)| {
            let sum: Vector3d = normals.iter().sum();
            let Some(average) = sum.try_normalize(f64::MIN_POSITIVE) else {
                return *p;
            };
            let alignment = normals
                .iter()
                .map(|n| n.dot(&average))
                .fold(f64::INFINITY, f64::min)
                .max(MIN_ALIGNMENT);
            p + average * (margin / alignment)
        })
        .collect()
}
