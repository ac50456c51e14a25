//! High-level template management: registration, lookup and rendering.

use super::loader;
use super::store::TemplateStore;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::engine::Engine;
use crate::error::{Result, StencilError};
use crate::filters::FilterError;
use crate::template::{NewTemplate, RenderedTemplate, Template};
use crate::value::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// A template store paired with an engine.
///
/// # Examples
///
/// ```
/// use stencil::catalog::TemplateManager;
/// use stencil::context::Context;
/// use stencil::template::{NewTemplate, TemplateType, TemplateVariable};
/// use serde_json::json;
///
/// let mut manager = TemplateManager::new();
/// manager.register(
///     NewTemplate::new("sms.code", "Login code", TemplateType::Sms, "Code: {{ code }}")
///         .variable(TemplateVariable::new("code")),
/// );
///
/// let ctx = Context::from_json(json!({"code": 4711})).unwrap();
/// let rendered = manager.render("sms.code", &ctx, None).unwrap();
/// assert_eq!(rendered.body, "Code: 4711");
/// ```
#[derive(Debug)]
pub struct TemplateManager {
    engine: Engine,
    store: TemplateStore,
    locale_fallbacks: BTreeMap<String, String>,
}

impl Default for TemplateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateManager {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            engine: Engine::with_config(config),
            store: TemplateStore::new(config.default_locale.clone()),
            locale_fallbacks: config.locale_fallbacks.clone(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TemplateStore {
        &mut self.store
    }

    /// Build a template from `new` and save it.
    pub fn register(&mut self, new: NewTemplate) -> Template {
        let template = new.build(self.store.default_locale());
        self.store.save(template.clone());
        template
    }

    /// Save every template file in `dir`, returning how many were loaded.
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        let templates = loader::load_dir(dir)?;
        let count = templates.len();
        for template in templates {
            self.store.save(template);
        }
        Ok(count)
    }

    /// The locale a lookup for `requested` uses after applying fallbacks.
    pub fn effective_locale(&self, requested: Option<&str>) -> String {
        match requested {
            Some(locale) => self
                .locale_fallbacks
                .get(locale)
                .cloned()
                .unwrap_or_else(|| locale.to_string()),
            None => self.store.default_locale().to_string(),
        }
    }

    /// Find `id` for `locale`, applying the fallback map and then the
    /// store's default locale.
    pub fn lookup(&self, id: &str, locale: Option<&str>) -> Result<&Template> {
        let requested = locale;
        let locale = self.effective_locale(requested);
        match requested {
            Some(requested) if requested != locale => {
                tracing::debug!(%id, %requested, %locale, "applying locale fallback");
            }
            _ => tracing::debug!(%id, %locale, "looking up template"),
        }
        self.store
            .get(id, &locale)
            .ok_or_else(|| StencilError::TemplateNotFound {
                id: id.to_string(),
                locale,
            })
    }

    pub fn render(
        &self,
        id: &str,
        context: &Context,
        locale: Option<&str>,
    ) -> Result<RenderedTemplate> {
        let template = self.lookup(id, locale)?;
        self.engine.render(template, context)
    }

    /// Render `id` with example values for every declared variable.
    pub fn preview(&self, id: &str, locale: Option<&str>) -> Result<RenderedTemplate> {
        let template = self.lookup(id, locale)?;
        self.engine.preview(template)
    }

    pub fn add_filter<F>(&self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value, &[Value]) -> std::result::Result<Value, FilterError> + Send + Sync + 'static,
    {
        self.engine.add_filter(name, filter);
    }

    pub fn set_global(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.engine.add_global(name, value);
    }

    /// Look up `fallback` whenever `locale` is requested.
    pub fn set_locale_fallback(&mut self, locale: impl Into<String>, fallback: impl Into<String>) {
        self.locale_fallbacks.insert(locale.into(), fallback.into());
    }
}
