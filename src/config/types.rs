//! Configuration types and defaults.
//!
//! This module defines the nested filter settings and the default value
//! functions used by `EngineConfig`.

use serde::{Deserialize, Serialize};

/// Defaults used by the built-in formatting filters when a template does not
/// pass explicit arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    /// Symbol prefixed by `currency` (default: "$").
    pub currency_symbol: String,

    /// strftime pattern used by `date` (default: "%Y-%m-%d").
    pub date_format: String,

    /// strftime pattern used by `datetime` (default: "%Y-%m-%d %H:%M").
    pub datetime_format: String,

    /// Maximum characters kept by `truncate` (default: 50).
    pub truncate_length: usize,

    /// Marker appended by `truncate` when text is cut (default: "...").
    pub truncate_suffix: String,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            date_format: default_date_format(),
            datetime_format: default_datetime_format(),
            truncate_length: default_truncate_length(),
            truncate_suffix: default_truncate_suffix(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_locale() -> String {
    "en".to_string()
}
pub(crate) fn default_currency_symbol() -> String {
    "$".to_string()
}
pub(crate) fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}
pub(crate) fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}
pub(crate) fn default_truncate_length() -> usize {
    50
}
pub(crate) fn default_truncate_suffix() -> String {
    "...".to_string()
}
