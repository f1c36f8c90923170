//! Unified configuration loading for VastuTSDF.
//!
//! Loads all configuration from a single YAML file with sensible defaults.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vastu_tsdf::config::TsdfSettings;
//!
//! // Load from default path (configs/config.yaml)
//! let settings = TsdfSettings::load_default()?;
//!
//! // Or use built-in defaults (no file needed)
//! let settings = TsdfSettings::default();
//!
//! // Convert to runtime config
//! let map = TsdfMap::new(settings.to_map_config());
//! let variance = settings.measurement_variance();
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`GridSection`] | Extent, resolution, origin, vertical band |
//! | [`FusionSection`] | Truncation, variance floor, measurement variance |
//!
//! ## Example YAML
//!
//! ```yaml
//! grid:
//!   resolution: 0.05        # 5cm cells
//!   num_cells_x: 400        # 20m
//!   num_cells_y: 400
//!   min_height: -0.2
//!   max_height: 2.0
//!
//! fusion:
//!   truncation: 0.3
//!   min_variance: 0.001
//!   measurement_variance: 0.01
//! ```

mod defaults;
mod error;
mod fusion;
mod grid;
mod settings;

// Re-export main types
pub use error::ConfigLoadError;
pub use settings::TsdfSettings;

// Re-export section types
pub use fusion::FusionSection;
pub use grid::GridSection;
