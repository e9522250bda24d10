//! Serde configuration for input locations and dashboard rules.
//!
//! Every field has a default matching the published dataset, so an empty
//! JSON object (`{}`) is a complete configuration.
//!
//! ```json
//! {
//!   "data": { "data_dir": "Data/processed" },
//!   "dashboard": { "excluded_region": "LIMA", "ratio_domain": { "max_y": 250.0 } }
//! }
//! ```

use crate::columns::boundary::REGION_PROPERTY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub dashboard: DashboardConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let delimiter = self.data.delimiter;
        if !delimiter.is_ascii() {
            return Err(ConfigError::Validation(format!(
                "delimiter '{delimiter}' must be a single ASCII character"
            )));
        }
        let domain = &self.dashboard.ratio_domain;
        if !(domain.max_x > 0.0 && domain.max_y > 0.0) {
            return Err(ConfigError::Validation(
                "ratio_domain maxima must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the four input files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub deposits_file: String,
    pub industry_loans_file: String,
    pub credit_file: String,
    pub boundaries_file: String,
    /// Field separator of the tabular files.
    pub delimiter: char,
    /// GeoJSON feature property carrying the region name.
    pub region_property: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data"),
            deposits_file: "an10_final.dsv".to_string(),
            industry_loans_file: "rep4b2_final.dsv".to_string(),
            credit_file: "an03_final.dsv".to_string(),
            boundaries_file: "peru_departamental_simple.geojson".to_string(),
            delimiter: '|',
            region_property: REGION_PROPERTY.to_string(),
        }
    }
}

impl DataConfig {
    pub fn deposits_path(&self) -> PathBuf {
        self.data_dir.join(&self.deposits_file)
    }

    pub fn industry_loans_path(&self) -> PathBuf {
        self.data_dir.join(&self.industry_loans_file)
    }

    pub fn credit_path(&self) -> PathBuf {
        self.data_dir.join(&self.credit_file)
    }

    pub fn boundaries_path(&self) -> PathBuf {
        self.data_dir.join(&self.boundaries_file)
    }

    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> u8 {
        // Validated ASCII; anything else falls back to the dataset default.
        u8::try_from(self.delimiter).unwrap_or(b'|')
    }
}

/// Filter values and chart domains used by the dashboard views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Region dropped from the map and summary views when `include_lima` is off.
    pub excluded_region: String,
    /// Industry dropped from the industry views when `include_personal_loans` is off.
    pub excluded_category: String,
    pub ratio_domain: RatioDomain,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            excluded_region: "LIMA".to_string(),
            excluded_category: "Personal/Mortgage loans".to_string(),
            ratio_domain: RatioDomain::default(),
        }
    }
}

/// What happens to scatter points outside the display domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipMode {
    Drop,
    Clamp,
}

/// Visible axis maxima of the ratio scatter: x is the denominator sum,
/// y the ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioDomain {
    pub max_x: f64,
    pub max_y: f64,
    pub clip_mode: ClipMode,
}

impl Default for RatioDomain {
    fn default() -> Self {
        Self {
            max_x: 5_000.0,
            max_y: 500.0,
            clip_mode: ClipMode::Drop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data.delimiter_byte(), b'|');
        assert_eq!(config.dashboard.excluded_region, "LIMA");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_json_str(
            r#"{"data": {"data_dir": "/srv/fip"}, "dashboard": {"ratio_domain": {"clip_mode": "clamp"}}}"#,
        )
        .unwrap();
        assert_eq!(config.data.deposits_path(), PathBuf::from("/srv/fip/an10_final.dsv"));
        assert_eq!(config.data.region_property, "NOMBDEP");
        assert_eq!(config.dashboard.ratio_domain.clip_mode, ClipMode::Clamp);
        assert_eq!(config.dashboard.ratio_domain.max_y, 500.0);
    }

    #[test]
    fn rejects_non_positive_domain() {
        let err = Config::from_json_str(r#"{"dashboard": {"ratio_domain": {"max_x": 0.0}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_non_ascii_delimiter() {
        let err = Config::from_json_str(r#"{"data": {"delimiter": "¦"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = Config::from_path(Path::new("/nonexistent/fip.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
