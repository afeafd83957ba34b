//! Bridge configuration
//!
//! ```toml
//! version_override = "1.16.5"
//! eager_resolution = true
//! logging = "production"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::errors::{Result, TagError};
use crate::logging_facility::Profile;
use crate::version::VersionToken;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Release string used instead of the host's own report
    pub version_override: Option<String>,
    /// Resolve every accessor and class when the context is built
    pub eager_resolution: bool,
    pub logging: Profile,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version_override: None,
            eager_resolution: true,
            logging: Profile::default(),
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: BridgeConfig = toml::from_str(text).map_err(|e| TagError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TagError::InvalidConfig {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    /// An override must name a known release
    fn validate(&self) -> Result<()> {
        if let Some(raw) = &self.version_override {
            if VersionToken::try_parse(raw).is_none() {
                return Err(TagError::InvalidConfig {
                    reason: format!("version_override '{}' is not a known release", raw),
                });
            }
        }
        Ok(())
    }

    /// Parsed override, if one is set
    pub fn version_override(&self) -> Option<VersionToken> {
        self.version_override
            .as_deref()
            .and_then(VersionToken::try_parse)
    }

    /// Install the configured logging profile (first call wins)
    pub fn init_logging(&self) {
        crate::logging_facility::init(self.logging);
    }
}
