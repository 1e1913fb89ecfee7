//! Host-facing collision settings

use serde::{Deserialize, Serialize};
use ucxcrate_core::{Error, Result};
use ucxcrate_simplification::ReductionParams;

/// Settings shared by every proxy command.
///
/// Missing fields in a TOML document take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Grow proxies by `offset`
    pub apply_offset: bool,
    /// Margin in world units
    pub offset: f64,
    /// Parent the proxy to its source, keeping its world placement
    pub parent_to_target: bool,
    /// Triangle budget for convex hull proxies
    pub tri_count_limit: u32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            apply_offset: true,
            offset: 1.0,
            parent_to_target: true,
            tri_count_limit: 32,
        }
    }
}

impl CollisionConfig {
    /// Check the settings before any geometry work.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] when `tri_count_limit` is zero or
    /// `offset` is negative or non-finite.
    pub fn validate(&self) -> Result<()> {
        if self.tri_count_limit < 1 {
            return Err(Error::invalid_config("tri_count_limit must be at least 1"));
        }
        if !self.offset.is_finite() || self.offset < 0.0 {
            return Err(Error::invalid_config(format!(
                "offset must be finite and non-negative, got {}",
                self.offset
            )));
        }
        Ok(())
    }

    /// Margin actually applied: `offset`, or zero when offsetting is off
    pub fn effective_offset(&self) -> f64 {
        if self.apply_offset {
            self.offset
        } else {
            0.0
        }
    }

    /// Conservative reduction to `tri_count_limit`
    pub fn reduction_params(&self) -> ReductionParams {
        ReductionParams::with_target(self.tri_count_limit as usize)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| Error::invalid_config(format!("failed to parse collision config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self)
            .map_err(|e| Error::invalid_config(format!("failed to serialize collision config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollisionConfig::default();
        assert!(config.apply_offset);
        assert_eq!(config.offset, 1.0);
        assert!(config.parent_to_target);
        assert_eq!(config.tri_count_limit, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let config = CollisionConfig {
            tri_count_limit: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));

        let config = CollisionConfig {
            offset: -0.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_effective_offset() {
        let mut config = CollisionConfig {
            offset: 0.25,
            ..Default::default()
        };
        assert_eq!(config.effective_offset(), 0.25);
        config.apply_offset = false;
        assert_eq!(config.effective_offset(), 0.0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = CollisionConfig::from_toml_str("tri_count_limit = 16\napply_offset = false\n").unwrap();
        assert_eq!(config.tri_count_limit, 16);
        assert!(!config.apply_offset);
        assert_eq!(config.offset, 1.0);
        assert!(config.parent_to_target);
        assert_eq!(config.reduction_params().target_triangles, 16);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CollisionConfig {
            offset: 0.05,
            parent_to_target: false,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(CollisionConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_toml_rejected() {
        assert!(matches!(
            CollisionConfig::from_toml_str("tri_count_limit = -3"),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            CollisionConfig::from_toml_str("tri_count_limit = 0"),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            CollisionConfig::from_toml_str("offset = \"wide\""),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
