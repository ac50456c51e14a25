//! Template records.
//!
//! A [`Template`] is the unit the engine renders: a subject, body and
//! optional HTML body written in one [`TemplateFormat`], plus declarations of
//! the variables it expects. Templates are plain data and deserialize from
//! YAML, so a catalog can be kept on disk:
//!
//! ```yaml
//! id: email.welcome
//! name: Welcome Email
//! template_type: email
//! format: jinja2
//! subject: "Welcome, {{ user.name }}!"
//! body: |
//!   Hi {{ user.name }},
//! variables:
//!   - name: user
//!     var_type: object
//!   - name: app_name
//!     default: Acme
//! metadata:
//!   category: onboarding
//! ```

use crate::value::{Map, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;


/// Metadata key that groups templates in a store.
pub const CATEGORY_KEY: &str = "category";

/// Category of templates that declare none.
pub const DEFAULT_CATEGORY: &str = "default";

/// The delivery channel a template is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Email,
    Sms,
    Push,
    Pdf,
    Html,
    Text,
    Markdown,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Email => "email",
            TemplateType::Sms => "sms",
            TemplateType::Push => "push",
            TemplateType::Pdf => "pdf",
            TemplateType::Html => "html",
            TemplateType::Text => "text",
            TemplateType::Markdown => "markdown",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which grammar the template text is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    /// `{{ expr | filter }}`, `{% for %}`, `{% if %}`.
    #[default]
    Jinja2,
    /// `{{name}}`, `{{{name}}}`, `{{#section}}`, `{{^inverted}}`.
    Mustache,
    /// Text is emitted unchanged.
    Plain,
}

impl TemplateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateFormat::Jinja2 => "jinja2",
            TemplateFormat::Mustache => "mustache",
            TemplateFormat::Plain => "plain",
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of a variable a template uses.
///
/// `var_type` is informational; it is not checked at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub name: String,

    #[serde(default = "default_var_type")]
    pub var_type: String,

    /// Whether a render must supply a value (a default counts).
    #[serde(default = "default_required")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Value used by previews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

fn default_var_type() -> String {
    "string".to_string()
}

fn default_required() -> bool {
    true
}

impl TemplateVariable {
    /// A required variable of type `string`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_type: default_var_type(),
            required: true,
            default: None,
            description: String::new(),
            example: None,
        }
    }

    /// An optional variable of type `string`.
    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name).required(false)
    }

    pub fn var_type(mut self, var_type: impl Into<String>) -> Self {
        self.var_type = var_type.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn example(mut self, value: impl Into<Value>) -> Self {
        self.example = Some(value.into());
        self
    }

    /// The default, unless it is absent or null.
    pub fn effective_default(&self) -> Option<&Value> {
        self.default.as_ref().filter(|v| !matches!(v, Value::Null))
    }

    /// The value a preview shows: example, else default, else `[name]`.
    pub fn preview_value(&self) -> Value {
        self.example
            .as_ref()
            .filter(|v| !matches!(v, Value::Null))
            .or_else(|| self.effective_default())
            .cloned()
            .unwrap_or_else(|| Value::String(format!("[{}]", self.name)))
    }
}

/// A stored template in one locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    // =========================================================================
    // Identity
    // =========================================================================
    /// Stable identifier shared by all locales (e.g. "email.welcome").
    pub id: String,

    /// Human-readable name.
    pub name: String,

    pub template_type: TemplateType,

    #[serde(default)]
    pub format: TemplateFormat,

    // =========================================================================
    // Content
    // =========================================================================
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default)]
    pub body: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<TemplateVariable>,

    // =========================================================================
    // Versioning
    // =========================================================================
    #[serde(default = "crate::config::types::default_locale")]
    pub locale: String,

    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    /// Free-form metadata; `category` groups templates in a store.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map,
}

fn default_version() -> u32 {
    1
}

impl Template {
    /// Names of variables a render must supply.
    pub fn required_variables(&self) -> BTreeSet<String> {
        self.variables
            .iter()
            .filter(|v| v.required)
            .map(|v| v.name.clone())
            .collect()
    }

    /// Declared defaults. Null defaults are treated as absent.
    pub fn variable_defaults(&self) -> Map {
        self.variables
            .iter()
            .filter_map(|v| v.effective_default().map(|d| (v.name.clone(), d.clone())))
            .collect()
    }

    /// The value of `metadata.category`, or [`DEFAULT_CATEGORY`].
    pub fn category(&self) -> String {
        match self.metadata.get(CATEGORY_KEY) {
            Some(Value::Null) | None => DEFAULT_CATEGORY.to_string(),
            Some(value) => value.to_string(),
        }
    }

    /// Every non-empty text of the template, labeled by field name.
    pub fn texts(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("subject", self.subject.as_deref()),
            ("body", Some(self.body.as_str())),
            ("html_body", self.html_body.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, text)| text.map(|t| (label, t)))
    }
}

/// Description of a template to register with a manager.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
    pub id: String,
    pub name: String,
    pub template_type: TemplateType,
    pub format: TemplateFormat,
    pub subject: Option<String>,
    pub body: String,
    pub html_body: Option<String>,
    pub locale: Option<String>,
    pub variables: Vec<TemplateVariable>,
    pub metadata: Map,
}

impl NewTemplate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        template_type: TemplateType,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            template_type,
            format: TemplateFormat::default(),
            subject: None,
            body: body.into(),
            html_body: None,
            locale: None,
            variables: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn format(mut self, format: TemplateFormat) -> Self {
        self.format = format;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn html_body(mut self, html_body: impl Into<String>) -> Self {
        self.html_body = Some(html_body.into());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn variable(mut self, variable: TemplateVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn category(self, category: impl Into<String>) -> Self {
        self.metadata(CATEGORY_KEY, category.into())
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the stored record, using `default_locale` when none was set.
    pub fn build(self, default_locale: &str) -> Template {
        let now = Utc::now();
        Template {
            id: self.id,
            name: self.name,
            template_type: self.template_type,
            format: self.format,
            subject: self.subject,
            body: self.body,
            html_body: self.html_body,
            variables: self.variables,
            locale: self.locale.unwrap_or_else(|| default_locale.to_string()),
            version: default_version(),
            created_at: now,
            updated_at: now,
            metadata: self.metadata,
        }
    }
}

/// Output of one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedTemplate {
    pub template_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    pub body: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,

    pub locale: String,

    pub rendered_at: DateTime<Utc>,

    /// Declared defaults merged with the caller's values, exactly as used.
    pub variables_used: Map,
}
