//! # Settings Module
//!
//! ## Purpose
//! Parameters of an analysis run, persisted as a JSON file.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "similarity_threshold": 0.7,
//!   "query_threshold": 0.7,
//!   "missing_structure": "skip",
//!   "dictionary": "compounds.json",
//!   "log_level": "info"
//! }
//! ```
//! Every field is optional, missing fields take the default value.
//!
//! ## Usage
//! ```rust, ignore
//! use bruttosim::settings::AnalysisSettings;
//!
//! let settings = AnalysisSettings::load_or_default("bruttosim.json")?;
//! println!("clustering threshold {}", settings.similarity_threshold);
//! ```

use crate::Comparison::clustering::MissingStructurePolicy;
use crate::Comparison::similarity::DEFAULT_THRESHOLD;
use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_SETTINGS_FILE: &str = "bruttosim.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),
}

/// Parameters of clustering and formula search.
///
/// # Fields
/// * `similarity_threshold` - coefficient a mention pair must exceed to be clustered
/// * `query_threshold` - coefficient a document mention must exceed to match a query
/// * `missing_structure` - treatment of mention pairs where a structure is missing
/// * `dictionary` - optional JSON file of compound names and their structure identifiers
/// * `log_level` - verbosity of the terminal logger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub similarity_threshold: f64,
    pub query_threshold: f64,
    pub missing_structure: MissingStructurePolicy,
    pub dictionary: Option<String>,
    pub log_level: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_THRESHOLD,
            query_threshold: DEFAULT_THRESHOLD,
            missing_structure: MissingStructurePolicy::Skip,
            dictionary: None,
            log_level: "info".to_string(),
        }
    }
}

impl AnalysisSettings {
    /// Reads and validates a settings file.
    pub fn from_file(file_name: &str) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(file_name)?;
        let settings: AnalysisSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        info!("settings loaded from '{}'", file_name);
        Ok(settings)
    }

    /// Like `from_file`, but a missing file gives the default settings
    pub fn load_or_default(file_name: &str) -> Result<Self, SettingsError> {
        if Path::new(file_name).exists() {
            Self::from_file(file_name)
        } else {
            warn!("settings file '{}' not found, using defaults", file_name);
            Ok(Self::default())
        }
    }

    pub fn save(&self, file_name: &str) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(file_name, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for threshold in [self.similarity_threshold, self.query_threshold] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(SettingsError::InvalidThreshold(threshold));
            }
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, SettingsError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| SettingsError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = AnalysisSettings::default();
        assert_eq!(settings.similarity_threshold, 0.7);
        assert_eq!(settings.query_threshold, 0.7);
        assert_eq!(settings.missing_structure, MissingStructurePolicy::Skip);
        assert_eq!(settings.level_filter().unwrap(), LevelFilter::Info);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let mut temp_config = NamedTempFile::new().unwrap();
        write!(
            temp_config,
            r#"{{ "similarity_threshold": 0.8, "missing_structure": "reuse_last" }}"#
        )
        .unwrap();
        let settings = AnalysisSettings::from_file(temp_config.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.similarity_threshold, 0.8);
        assert_eq!(settings.query_threshold, 0.7);
        assert_eq!(settings.missing_structure, MissingStructurePolicy::ReuseLast);
        assert_eq!(settings.dictionary, None);
    }

    #[test]
    fn test_invalid_values() {
        let mut temp_config = NamedTempFile::new().unwrap();
        write!(temp_config, r#"{{ "query_threshold": 1.5 }}"#).unwrap();
        let result = AnalysisSettings::from_file(temp_config.path().to_str().unwrap());
        assert!(matches!(result, Err(SettingsError::InvalidThreshold(_))));

        let settings = AnalysisSettings {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp_config = NamedTempFile::new().unwrap();
        let path = temp_config.path().to_str().unwrap();
        let settings = AnalysisSettings {
            similarity_threshold: 0.9,
            dictionary: Some("compounds.json".to_string()),
            log_level: "debug".to_string(),
            ..Default::default()
        };
        settings.save(path).unwrap();
        let loaded = AnalysisSettings::load_or_default(path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_file() {
        let settings = AnalysisSettings::load_or_default("no_such_settings.json").unwrap();
        assert_eq!(settings, AnalysisSettings::default());
        assert!(AnalysisSettings::from_file("no_such_settings.json").is_err());
    }
}
