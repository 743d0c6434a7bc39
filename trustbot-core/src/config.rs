//! Generator Configuration - Constructed Once, Passed Explicitly
//!
//! Owner, banner and identifier settings live here instead of in globals.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::identifier::{parse_time_zone, IdentifierError};

pub const DEFAULT_ID_PREFIX: &str = "DRR-TRUSTBOT-ALPHA-CEC1-SENTINEL-FCPS1.0";
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";
pub const DEFAULT_OWNER: &str = "Devon R. Robinson Private Trust";
pub const DEFAULT_CONFIDENTIALITY: &str = "Confidential & Proprietary — Distribution Restricted";
pub const DEFAULT_DISCLAIMER: &str =
    "Educational draft only. Not legal advice. Review with a qualified attorney.";
pub const DEFAULT_MAILING_ADDRESS: &str = "350 Northern Blvd, Albany, NY 12204, Ste 324";
pub const DEFAULT_JURISDICTION_TEXT: &str = "This private trust is organized and administered under common law. Any reference to state or federal systems is solely for administrative purposes and does not confer jurisdiction absent the Trustees’ explicit, written consent.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    TimeZone(#[from] IdentifierError),

    #[error("Config field '{0}' must not be empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub id_prefix: String,
    pub time_zone: String,
    pub owner: String,
    pub confidentiality: String,
    pub disclaimer: String,
    pub default_mailing_address: String,
    pub default_jurisdiction_text: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            confidentiality: DEFAULT_CONFIDENTIALITY.to_string(),
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
            default_mailing_address: DEFAULT_MAILING_ADDRESS.to_string(),
            default_jurisdiction_text: DEFAULT_JURISDICTION_TEXT.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file. Keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyField("idPrefix"));
        }
        if self.owner.trim().is_empty() {
            return Err(ConfigError::EmptyField("owner"));
        }
        parse_time_zone(&self.time_zone)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"owner": "Example Family Trust"}}"#).unwrap();

        let config = GeneratorConfig::load(file.path()).unwrap();
        assert_eq!(config.owner, "Example Family Trust");
        assert_eq!(config.id_prefix, DEFAULT_ID_PREFIX);
        assert_eq!(config.time_zone, DEFAULT_TIME_ZONE);
    }

    #[test]
    fn test_unknown_time_zone_rejected() {
        let config = GeneratorConfig {
            time_zone: "Mars/Olympus_Mons".to_string(),
            ..GeneratorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::TimeZone(_))));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let config = GeneratorConfig {
            id_prefix: "  ".to_string(),
            ..GeneratorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyField("idPrefix"))));
    }
}
