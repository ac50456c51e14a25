//! Stencil: a dual-grammar text template engine.
//!
//! Templates are rendered against a layered [`context::Context`] of tagged
//! [`value::Value`]s by one of two grammars:
//!
//! - a control-flow grammar with `{{ path | filter(args) }}` interpolation,
//!   `{% for %}` loops and `{% if %}`/`{% elif %}`/`{% else %}` conditionals;
//! - a section grammar with escaped `{{name}}`, raw `{{{name}}}`, list and
//!   truthy sections `{{#name}}` and inverted sections `{{^name}}`.
//!
//! An [`engine::Engine`] holds the filters and global values shared by every
//! render, and the [`catalog::TemplateManager`] adds storage by id and locale
//! on top of it.
//!
//! ```
//! use stencil::context::Context;
//! use stencil::engine::Engine;
//! use serde_json::json;
//!
//! let engine = Engine::new();
//! let ctx = Context::from_json(json!({"items": ["a", "b"]})).unwrap();
//! let out = engine
//!     .render_control_flow("{% for i in items %}{{ loop.index }}={{ i | upper }} {% endfor %}", &ctx)
//!     .unwrap();
//! assert_eq!(out, "1=A 2=B ");
//! ```

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod condition;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod expr;
pub mod filters;
pub mod render;
pub mod template;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, StencilError};
