//! Engine configuration for stencil.
//!
//! This module defines the `EngineConfig` struct, usually read from a
//! `stencil.yaml` file. It supports forward-compatible YAML parsing (unknown
//! fields are ignored), defaults for every field, and validation of values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::EngineConfig;
pub use types::FilterDefaults;
