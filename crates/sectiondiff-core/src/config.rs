//! Coordinator configuration
//!
//! Loaded from TOML (all keys optional):
//!
//! ```toml
//! fade_delete_ms = 250
//! staging = "sections_then_items"
//! max_operations = 200
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::{Result, SectionDiffError};

/// How many changesets the coordinator requests per update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Staging {
    /// One changeset carrying both levels
    #[default]
    Single,
    /// Section-level edits first, item-level edits second
    SectionsThenItems,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Delay of the single-deletion fade step; `None` disables it
    pub fade_delete_ms: Option<u64>,
    pub staging: Staging,
    /// Reload instead of animating above this many edits (CLI policy)
    pub max_operations: Option<u64>,
}

impl CoordinatorConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on malformed TOML, unknown keys, or invalid
    /// values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: CoordinatorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`CoordinatorConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if `fade_delete_ms` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.fade_delete_ms == Some(0) {
            return Err(SectionDiffError::InvalidConfig {
                reason: "fade_delete_ms must be greater than zero (omit it to disable fading)"
                    .to_string(),
            });
        }
        Ok(())
    }

    pub fn fade_delete_duration(&self) -> Option<Duration> {
        self.fade_delete_ms.map(Duration::from_millis)
    }

    pub fn with_fade_delete_ms(mut self, millis: u64) -> Self {
        self.fade_delete_ms = Some(millis);
        self
    }

    pub fn with_staging(mut self, staging: Staging) -> Self {
        self.staging = staging;
        self
    }

    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        self.max_operations = Some(max_operations);
        self
    }
}
