//! Main TsdfSettings and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::MapConfig;

use super::error::ConfigLoadError;
use super::fusion::FusionSection;
use super::grid::GridSection;

/// Full VastuTSDF configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TsdfSettings {
    /// Grid settings
    #[serde(default)]
    pub grid: GridSection,

    /// Fusion settings
    #[serde(default)]
    pub fusion: FusionSection,
}

impl TsdfSettings {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/config.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/config.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("{} not found, using built-in defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let settings: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check all sections.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.grid.validate()?;
        self.fusion.validate()
    }

    /// Convert to MapConfig for TsdfMap
    pub fn to_map_config(&self) -> MapConfig {
        MapConfig {
            grid: self.grid.to_grid_config(),
            fusion: self.fusion.to_fusion_config(),
        }
    }

    /// Variance to pass with each measurement
    pub fn measurement_variance(&self) -> f32 {
        self.fusion.measurement_variance
    }
}
