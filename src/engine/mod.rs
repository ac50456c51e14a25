//! Render orchestration.
//!
//! An [`Engine`] owns the filter registry and the global values shared by
//! every render. Both live behind read-write locks as immutable snapshots:
//! registration copies the current snapshot, changes the copy, and swaps it
//! in, while each render clones the `Arc`s once up front and works from them
//! without holding a lock. Renders running on other threads are never
//! affected by a registration that happens mid-render.
//!
//! Rendering a [`Template`] proceeds as follows:
//!
//! 1. Declared defaults are overlaid beneath the caller's context.
//! 2. Every required variable must be present in that merged mapping, or the
//!    render fails before any text is produced.
//! 3. The subject, body and HTML body are rendered independently with the
//!    grammar named by the template's format, against the globals layered
//!    beneath the merged mapping.

use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::{Result, StencilError};
use crate::filters::{FilterError, FilterRegistry};
use crate::render;
use crate::template::{RenderedTemplate, Template, TemplateFormat};
use crate::value::{Map, Value};
use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock};


/// The registries a single render works from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub filters: Arc<FilterRegistry>,
    pub globals: Arc<Map>,
}

impl Snapshot {
    /// The globals as the outermost context layer, with `vars` on top.
    pub fn context(&self, vars: Map) -> Context {
        Context::from_map((*self.globals).clone()).extend(vars)
    }
}

/// A configured template engine.
///
/// # Examples
///
/// ```
/// use stencil::context::Context;
/// use stencil::engine::Engine;
/// use serde_json::json;
///
/// let engine = Engine::new();
/// engine.add_global("app_name", "Acme");
///
/// let ctx = Context::from_json(json!({"price": 19.5})).unwrap();
/// let out = engine.render_control_flow("{{ app_name }}: {{ price | currency }}", &ctx).unwrap();
/// assert_eq!(out, "Acme: $19.50");
/// ```
#[derive(Debug)]
pub struct Engine {
    filters: RwLock<Arc<FilterRegistry>>,
    globals: RwLock<Arc<Map>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine with the built-in filters and default settings.
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// An engine whose built-in filters and globals come from `config`.
    pub fn with_config(config: &EngineConfig) -> Self {
        let filters = FilterRegistry::with_builtins(&config.filters);
        let globals: Map = config.globals.clone();
        Self {
            filters: RwLock::new(Arc::new(filters)),
            globals: RwLock::new(Arc::new(globals)),
        }
    }

    /// Register (or replace) a named filter visible to every later render.
    pub fn add_filter<F>(&self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value, &[Value]) -> std::result::Result<Value, FilterError> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(filter = %name, "registering filter");
        let mut guard = self.filters.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut *guard).register(name, filter);
    }

    /// Set a named value visible to every later render.
    pub fn add_global(&self, name: impl Into<String>, value: impl Into<Value>) {
        let mut guard = self.globals.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut *guard).insert(name.into(), value.into());
    }

    /// The current filters and globals.
    pub fn snapshot(&self) -> Snapshot {
        let filters = self.filters.read().unwrap_or_else(PoisonError::into_inner);
        let globals = self.globals.read().unwrap_or_else(PoisonError::into_inner);
        Snapshot {
            filters: Arc::clone(&*filters),
            globals: Arc::clone(&*globals),
        }
    }

    /// Registered filter names, sorted.
    pub fn filter_names(&self) -> Vec<String> {
        self.snapshot()
            .filters
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Render text in the control-flow grammar.
    pub fn render_control_flow(&self, text: &str, context: &Context) -> Result<String> {
        self.render_with(TemplateFormat::Jinja2, text, context)
    }

    /// Render text in the section grammar.
    pub fn render_sections(&self, text: &str, context: &Context) -> Result<String> {
        self.render_with(TemplateFormat::Mustache, text, context)
    }

    fn render_with(&self, format: TemplateFormat, text: &str, context: &Context) -> Result<String> {
        let snapshot = self.snapshot();
        let ctx = snapshot.context(context.flatten());
        render::render_text(format, text, &ctx, &snapshot.filters)
    }

    /// Render every text of `template` against `context`.
    ///
    /// Fails with [`StencilError::MissingRequiredVariables`] before rendering
    /// anything when a required variable has neither a caller value nor a
    /// default.
    pub fn render(&self, template: &Template, context: &Context) -> Result<RenderedTemplate> {
        let mut merged = template.variable_defaults();
        merged.extend(context.flatten());

        let missing: Vec<String> = template
            .required_variables()
            .into_iter()
            .filter(|name| !merged.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(StencilError::MissingRequiredVariables {
                template_id: template.id.clone(),
                names: missing,
            });
        }

        tracing::debug!(
            template = %template.id,
            locale = %template.locale,
            format = %template.format,
            "rendering template"
        );

        let snapshot = self.snapshot();
        let ctx = snapshot.context(merged.clone());
        let render_text =
            |text: &str| render::render_text(template.format, text, &ctx, &snapshot.filters);

        let subject = template
            .subject
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(render_text)
            .transpose()?;
        let body = render_text(&template.body)?;
        let html_body = template
            .html_body
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(render_text)
            .transpose()?;

        Ok(RenderedTemplate {
            template_id: template.id.clone(),
            subject,
            body,
            html_body,
            locale: template.locale.clone(),
            rendered_at: Utc::now(),
            variables_used: merged,
        })
    }

    /// Render `template` with each declared variable set to its preview
    /// value (example, else default, else `[name]`).
    pub fn preview(&self, template: &Template) -> Result<RenderedTemplate> {
        let context: Context = template
            .variables
            .iter()
            .map(|v| (v.name.clone(), v.preview_value()))
            .collect();
        self.render(template, &context)
    }
}
