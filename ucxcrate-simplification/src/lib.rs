//! Triangle-budget reduction for convex collision shells
//!
//! This crate brings a closed shell down to a triangle budget:
//! - Edge collapse with quadric error metrics on a half-edge mesh
//! - Convexity restore by re-hulling the surviving vertices
//! - Optional conservative inflation so the result still covers the input
//!
//! The budget is best effort. A closed triangulated shell loses two
//! triangles per collapse and never goes below a tetrahedron, so the final
//! count can land under an odd target or stay above an unreachable one.

pub mod edge_collapse;
pub mod params;
pub mod restore;
pub mod result;

pub use edge_collapse::*;
pub use params::*;
pub use restore::*;
pub use result::*;

use ucxcrate_core::{Mesh, Result};

/// Reduce a closed mesh toward a triangle budget
pub trait MeshSimplifier {
    /// Simplify `mesh` to at most `target` triangles where possible.
    ///
    /// Inputs already within budget come back unchanged.
    fn simplify(&self, mesh: &Mesh, target: usize) -> Result<ReductionResult>;
}

/// Reduce with explicit parameters.
pub fn reduce_with(mesh: &Mesh, params: &ReductionParams) -> Result<ReductionResult> {
    EdgeCollapseSimplifier::from_params(params).simplify(mesh, params.target_triangles)
}

/// Reduce a closed mesh to at most `target` triangles, conservatively.
///
/// # Errors
///
/// * [`ucxcrate_core::Error::InvalidConfiguration`] when `target` is zero
/// * [`ucxcrate_core::Error::InvalidData`] for a malformed or open mesh
///
/// # Example
///
/// ```rust
/// use ucxcrate_core::Point3d;
/// use ucxcrate_hull::build_convex_hull;
/// use ucxcrate_simplification::reduce_triangle_count;
///
/// let points: Vec<Point3d> = (0..60)
///     .map(|i| {
///         let t = i as f64 * 0.7;
///         let y = 1.0 - 2.0 * (i as f64 + 0.5) / 60.0;
///         let r = (1.0 - y * y).sqrt();
///         Point3d::new(r * t.cos(), y, r * t.sin())
///     })
///     .collect();
/// let hull = build_convex_hull(&points).unwrap().mesh;
/// let reduced = reduce_triangle_count(&hull, 32).unwrap();
/// assert!(reduced.triangle_count() <= hull.triangle_count());
/// assert!(reduced.is_closed());
/// ```
pub fn reduce_triangle_count(mesh: &Mesh, target: u32) -> Result<Mesh> {
    Ok(reduce_with(mesh, &ReductionParams::with_target(target as usize))?.mesh)
}
