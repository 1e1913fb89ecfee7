//! Result type for triangle-budget reduction.

use ucxcrate_core::Mesh;

/// Outcome of a reduction run.
///
/// The target is best effort: collapses stop at a tetrahedron or when no
/// legal collapse remains, so `final_triangles` can stay above
/// `target_triangles`. Use [`ReductionResult::reached_target`] to tell.
#[derive(Debug, Clone)]
pub struct ReductionResult {
    /// The reduced mesh.
    pub mesh: Mesh,

    /// Triangle count of the input.
    pub original_triangles: usize,

    /// Requested triangle budget.
    pub target_triangles: usize,

    /// Triangle count of `mesh`.
    pub final_triangles: usize,

    /// Number of edge collapses performed.
    pub collapses_performed: usize,

    /// Number of edge collapses rejected (link condition or face flip).
    pub collapses_rejected: usize,
}

impl ReductionResult {
    /// Result for an input that is returned as-is
    pub fn unchanged(mesh: Mesh, target_triangles: usize) -> Self {
        let triangles = mesh.triangle_count();
        Self {
            mesh,
            original_triangles: triangles,
            target_triangles,
            final_triangles: triangles,
            collapses_performed: 0,
            collapses_rejected: 0,
        }
    }

    /// Whether the output fits the budget.
    #[must_use]
    pub fn reached_target(&self) -> bool {
        self.final_triangles <= self.target_triangles
    }

    /// Final over original triangle count.
    #[must_use]
    pub fn reduction_ratio(&self) -> f64 {
        if self.original_triangles == 0 {
            1.0
        } else {
            self.final_triangles as f64 / self.original_triangles as f64
        }
    }

    #[must_use]
    pub fn was_reduced(&self) -> bool {
        self.final_triangles < self.original_triangles
    }
}

impl std::fmt::Display for ReductionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Reduction: {} -> {} triangles (target {}, {} collapses, {} rejected)",
            self.original_triangles,
            self.final_triangles,
            self.target_triangles,
            self.collapses_performed,
            self.collapses_rejected
        )?;
        if !self.reached_target() {
            write!(f, " [target missed]")?;
        }
        Ok(())
    }
}
