//! EngineConfig struct definition and default implementation.

use super::types::*;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for a template engine and its manager.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // =========================================================================
    // Locale settings
    // =========================================================================
    /// Locale used when a lookup names none, and the last-resort fallback
    /// of the template store (default: "en").
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Requested locale -> locale to look up instead.
    #[serde(default)]
    pub locale_fallbacks: BTreeMap<String, String>,

    // =========================================================================
    // Render settings
    // =========================================================================
    /// Values visible in every render, beneath the caller's context.
    #[serde(default)]
    pub globals: BTreeMap<String, Value>,

    /// Defaults for the built-in filters.
    #[serde(default)]
    pub filters: FilterDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            locale_fallbacks: BTreeMap::new(),
            globals: BTreeMap::new(),
            filters: FilterDefaults::default(),
        }
    }
}
