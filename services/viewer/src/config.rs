//! Viewer configuration.
//!
//! An optional YAML file overrides the basemap, the initial viewport and the
//! overlay styles. Every field has a default, so an empty file is valid:
//!
//! ```yaml
//! map:
//!   center: [-6.2, 106.8]
//!   zoom: 10
//! styles:
//!   raster:
//!     opacity: 0.5
//!   contour:
//!     color: "#0044ff"
//!     weight: 1.5
//! ```

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use layer_controller::MapView;
use map_common::OverlayStyles;
use serde::{Deserialize, Serialize};
use tracing::info;

/// How the viewer fills the map at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Populate the selections and wait for the user to choose
    Interactive,
    /// Add every listed file as its own layer
    AutoLoad,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub map: MapView,
    pub styles: OverlayStyles,
}

impl ViewerConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        info!(path = %path.display(), "Loaded viewer configuration");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ViewerConfig = if content.trim().is_empty() {
            ViewerConfig::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML")?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.styles.validate().map_err(|e| anyhow!(e))?;

        let (lat, lon) = self.map.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(anyhow!("map center ({}, {}) is not a valid lat/lon", lat, lon));
        }
        if self.map.zoom > 22 {
            return Err(anyhow!("map zoom {} is out of range", self.map.zoom));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ViewerConfig::from_yaml("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.map.center, (-6.2, 106.8));
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.styles.raster.opacity, 0.7);
    }

    #[test]
    fn test_partial_override() {
        let yaml = r##"
map:
  zoom: 7
styles:
  raster:
    opacity: 0.5
  contour:
    color: "#0044ff"
"##;
        let config = ViewerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.map.zoom, 7);
        assert_eq!(config.map.center, (-6.2, 106.8));
        assert_eq!(config.styles.raster.opacity, 0.5);
        assert_eq!(config.styles.raster.resolution, 256);
        assert_eq!(config.styles.contour.color.to_rgba(), (0, 68, 255, 255));
        assert_eq!(config.styles.contour.weight, 2.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ViewerConfig::from_yaml("styles:\n  raster:\n    opacity: 2.0\n").is_err());
        assert!(ViewerConfig::from_yaml("map:\n  center: [95.0, 10.0]\n").is_err());
        assert!(ViewerConfig::from_yaml("map: [not, a, map]\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.yaml");
        std::fs::write(&path, "map:\n  zoom: 12\n").unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.map.zoom, 12);
        assert!(ViewerConfig::load(&dir.path().join("missing.yaml")).is_err());
    }
}
