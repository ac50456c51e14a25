//! Config loading, validation, and serialization.

use super::model::EngineConfig;
use crate::error::{Result, StencilError};
use chrono::format::{Item, StrftimeItems};
use std::path::Path;

impl EngineConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(EngineConfig)` - Successfully loaded and validated config
    /// * `Err(StencilError::Config)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            StencilError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig = if yaml.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| StencilError::Config(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| StencilError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `default_locale` and every fallback entry must be non-empty
    /// - `filters.truncate_length` must be positive
    /// - `filters.date_format` and `filters.datetime_format` must be valid strftime patterns
    pub fn validate(&self) -> Result<()> {
        if self.default_locale.trim().is_empty() {
            return Err(StencilError::Config(
                "default_locale must not be empty".to_string(),
            ));
        }

        for (from, to) in &self.locale_fallbacks {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err(StencilError::Config(format!(
                    "locale_fallbacks entries must be non-empty (found '{}' -> '{}')",
                    from, to
                )));
            }
        }

        if self.filters.truncate_length == 0 {
            return Err(StencilError::Config(
                "filters.truncate_length must be greater than 0".to_string(),
            ));
        }

        for (field, pattern) in [
            ("filters.date_format", &self.filters.date_format),
            ("filters.datetime_format", &self.filters.datetime_format),
        ] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(StencilError::Config(format!(
                    "{} is not a valid strftime pattern: '{}'",
                    field, pattern
                )));
            }
        }

        Ok(())
    }
}
