// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Engine configuration

use crate::error::{CsgError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest sagitta error a circle approximation accepts
pub const MIN_CIRCLE_ERROR: f64 = 1e-6;
/// Largest sagitta error a circle approximation accepts
pub const MAX_CIRCLE_ERROR: f64 = 10.0;

/// Tunables for primitive generation and boolean operations.
///
/// Passed explicitly to the operations that need it; `Default` gives the
/// values used by `Solid::union`, `Solid::intersection` and `Solid::difference`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsgConfig {
    /// Maximum sagitta when approximating circles with chords
    pub circle_error: f64,
    /// Number of random ray perturbations tried before classification fails
    pub max_ray_perturbations: u32,
    /// Magnitude of one ray perturbation
    pub ray_perturbation: f64,
    /// Seed for the perturbation generator
    pub ray_seed: u64,
    /// Face splitting fails once a mesh grows past this multiple of the input face count
    pub max_split_growth: usize,
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self {
            circle_error: 1e-2,
            max_ray_perturbations: 64,
            ray_perturbation: 1e-5,
            ray_seed: 0x5EED,
            max_split_growth: 64,
        }
    }
}

impl CsgConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CsgConfig =
            toml::from_str(content).map_err(|e| CsgError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: CsgConfig = toml::from_str(&content)
            .map_err(|e| CsgError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `trisolid.toml` from the working directory if present, then apply
    /// environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from("trisolid.toml").exists() {
            Self::from_file("trisolid.toml")?
        } else {
            Self::default()
        };

        if let Ok(error) = std::env::var("TRISOLID_CIRCLE_ERROR") {
            if let Ok(value) = error.parse() {
                config.circle_error = value;
            }
        }

        if let Ok(seed) = std::env::var("TRISOLID_RAY_SEED") {
            if let Ok(value) = seed.parse() {
                config.ray_seed = value;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CsgError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_CIRCLE_ERROR..=MAX_CIRCLE_ERROR).contains(&self.circle_error) {
            return Err(CsgError::Config(format!(
                "circle_error must lie in [{}, {}], got {}",
                MIN_CIRCLE_ERROR,
                MAX_CIRCLE_ERROR,
                self.circle_error
            )));
        }
        if !(self.ray_perturbation > 0.0) {
            return Err(CsgError::Config(format!(
                "ray_perturbation must be positive, got {}",
                self.ray_perturbation
            )));
        }
        if self.max_split_growth == 0 {
            return Err(CsgError::Config("max_split_growth must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CsgConfig::from_toml_str("circle_error = 0.5\nray_seed = 7\n").unwrap();
        assert_eq!(config.circle_error, 0.5);
        assert_eq!(config.ray_seed, 7);
        assert_eq!(config.max_ray_perturbations, 64);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(CsgConfig::from_toml_str("circle_error = -1.0").is_err());
        assert!(CsgConfig::from_toml_str("circle_error = 20.0").is_err());
        assert!(CsgConfig::from_toml_str("circle_error = 1e-7").is_err());
        assert!(CsgConfig::from_toml_str("circle_error = 10.0").is_ok());
        assert!(CsgConfig::from_toml_str("max_split_growth = 0").is_err());
        assert!(CsgConfig::from_toml_str("circle_error = \"big\"").is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = CsgConfig {
            ray_seed: 42,
            ..CsgConfig::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(CsgConfig::from_toml_str(&text).unwrap(), config);
    }
}
