//! Settings for gridding, quality control and the cloud model.
//!
//! Every field has a default, so a RON file only needs the values it changes:
//!
//! ```text
//! (
//!     grid: (top_m: 15000.0, step_m: 50.0),
//!     cloud: (rh_cloud_pct: 90.0),
//! )
//! ```
use crate::errors::RaobErr;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// All the settings for `raobgrid`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub grid: GridSpec,
    pub qc: QcConfig,
    pub cloud: CloudConfig,
}

/// The fixed altitude grid, meters above mean sea level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub bottom_m: f64,
    pub top_m: f64,
    pub step_m: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            bottom_m: 0.0,
            top_m: 20_000.0,
            step_m: 100.0,
        }
    }
}

/// Acceptance and quality flag thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    /// Fewer usable levels than this and the sounding is rejected.
    pub min_levels: usize,
    /// Largest vertical distance between levels before flagging a gap.
    pub max_gap_m: f64,
    /// Profiles that stop below this height are flagged as shallow.
    pub min_top_m: f64,
}

impl Default for QcConfig {
    fn default() -> Self {
        QcConfig {
            min_levels: 10,
            max_gap_m: 1_000.0,
            min_top_m: 10_000.0,
        }
    }
}

/// Parameters of the toy cloud and precipitation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub rh_cloud_pct: f64,
    pub max_lwc_gm3: f64,
    pub max_iwc_gm3: f64,
    /// At or below this temperature all condensate is ice.
    pub ice_temp_c: f64,
    pub precip_min_depth_m: f64,
    pub precip_fraction: f64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        CloudConfig {
            rh_cloud_pct: 95.0,
            max_lwc_gm3: 0.5,
            max_iwc_gm3: 0.1,
            ice_temp_c: -20.0,
            precip_min_depth_m: 1_500.0,
            precip_fraction: 0.3,
        }
    }
}

impl GridConfig {
    /// Load from a RON file and validate.
    pub fn load(path: &Path) -> Result<Self, RaobErr> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Parse from a RON string and validate.
    pub fn from_ron(contents: &str) -> Result<Self, RaobErr> {
        let config: GridConfig = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values make sense together.
    pub fn validate(&self) -> Result<(), RaobErr> {
        let GridSpec {
            bottom_m,
            top_m,
            step_m,
        } = self.grid;

        if !(step_m > 0.0) {
            return Err(RaobErr::InvalidConfig(format!(
                "grid step must be positive, got {}",
                step_m
            )));
        }

        if !(top_m > bottom_m) {
            return Err(RaobErr::InvalidConfig(format!(
                "grid top ({}) must be above grid bottom ({})",
                top_m, bottom_m
            )));
        }

        let rh = self.cloud.rh_cloud_pct;
        if !(rh > 0.0 && rh < 100.0) {
            return Err(RaobErr::InvalidConfig(format!(
                "cloud relative humidity threshold must be in (0, 100), got {}",
                rh
            )));
        }

        if self.cloud.ice_temp_c >= 0.0 {
            return Err(RaobErr::InvalidConfig(format!(
                "all-ice temperature must be below freezing, got {}",
                self.cloud.ice_temp_c
            )));
        }

        if self.qc.min_levels < 2 {
            return Err(RaobErr::InvalidConfig(
                "need at least 2 levels to interpolate".to_owned(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GridConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron() {
        let config = GridConfig::from_ron(
            "(grid: (top_m: 15000.0, step_m: 50.0), cloud: (rh_cloud_pct: 90.0))",
        )
        .unwrap();

        assert_eq!(config.grid.bottom_m, 0.0);
        assert_eq!(config.grid.top_m, 15_000.0);
        assert_eq!(config.grid.step_m, 50.0);
        assert_eq!(config.cloud.rh_cloud_pct, 90.0);
        assert_eq!(config.cloud.max_lwc_gm3, 0.5);
        assert_eq!(config.qc, QcConfig::default());
    }

    #[test]
    fn test_empty_ron_is_default() {
        assert_eq!(GridConfig::from_ron("()").unwrap(), GridConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        assert!(GridConfig::from_ron("(grid: (step_m: 0.0))").is_err());
        assert!(GridConfig::from_ron("(grid: (bottom_m: 5000.0, top_m: 1000.0))").is_err());
        assert!(GridConfig::from_ron("(cloud: (rh_cloud_pct: 100.0))").is_err());
        assert!(GridConfig::from_ron("(qc: (min_levels: 1))").is_err());
        assert!(GridConfig::from_ron("(grid: (step_m: \"big\"))").is_err());
    }
}
