//! Parameters for triangle-budget reduction.

use serde::{Deserialize, Serialize};

/// Triangle budget applied when none is given
pub const DEFAULT_TARGET_TRIANGLES: usize = 32;

/// Parameters for reducing a closed shell to a triangle budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionParams {
    /// Desired triangle count of the output.
    pub target_triangles: usize,

    /// Inflate the reduced hull about its centroid until it covers every
    /// input vertex.
    pub conservative: bool,

    /// Reject collapses that would flip or flatten a neighboring face.
    pub flip_guard: bool,
}

impl Default for ReductionParams {
    fn default() -> Self {
        Self {
            target_triangles: DEFAULT_TARGET_TRIANGLES,
            conservative: true,
            flip_guard: true,
        }
    }
}

impl ReductionParams {
    /// Default parameters for a given budget.
    #[must_use]
    pub fn with_target(target_triangles: usize) -> Self {
        Self {
            target_triangles,
            ..Default::default()
        }
    }

    /// Allow the reduced hull to cut into the input.
    #[must_use]
    pub const fn non_conservative(mut self) -> Self {
        self.conservative = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ReductionParams::default();
        assert_eq!(params.target_triangles, 32);
        assert!(params.conservative);
        assert!(params.flip_guard);
    }

    #[test]
    fn test_builders() {
        let params = ReductionParams::with_target(12).non_conservative();
        assert_eq!(params.target_triangles, 12);
        assert!(!params.conservative);
        assert!(params.flip_guard);
    }
}
