//! Block renderers for the two template grammars.
//!
//! Both grammars are handled the same way: an explicit tokenizer finds the
//! markers, a recursive-descent parser matches open and close tags by depth
//! into a node tree, and the tree is evaluated against a [`Context`]. Output
//! text is never scanned again, so values that happen to contain template
//! syntax are emitted literally.
//!
//! - [`control_flow`]: `{{ expr | filter }}`, `{% for %}`, `{% if %}`
//! - [`sections`]: `{{name}}`, `{{{name}}}`, `{{#name}}`, `{{^name}}`

pub mod control_flow;
mod scan;
pub mod sections;

use crate::context::Context;
use crate::error::Result;
use crate::filters::FilterRegistry;
use crate::template::TemplateFormat;

/// Render `text` with the grammar selected by `format`.
///
/// [`TemplateFormat::Plain`] returns the text unchanged.
pub fn render_text(
    format: TemplateFormat,
    text: &str,
    context: &Context,
    filters: &FilterRegistry,
) -> Result<String> {
    match format {
        TemplateFormat::Jinja2 => control_flow::render(text, context, filters),
        TemplateFormat::Mustache => sections::render(text, context, filters),
        TemplateFormat::Plain => Ok(text.to_string()),
    }
}

/// Parse `text` without rendering it, reporting block structure errors.
pub fn check(format: TemplateFormat, text: &str) -> Result<()> {
    match format {
        TemplateFormat::Jinja2 => control_flow::parse(text).map(drop),
        TemplateFormat::Mustache => sections::parse(text).map(drop),
        TemplateFormat::Plain => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StencilError;
    use serde_json::json;

    #[test]
    fn test_dispatch_by_format() {
        let ctx = Context::from_json(json!({"name": "<Ann>"})).unwrap();
        let filters = FilterRegistry::new();
        let text = "{{ name }}";

        assert_eq!(
            render_text(TemplateFormat::Jinja2, text, &ctx, &filters).unwrap(),
            "<Ann>"
        );
        assert_eq!(
            render_text(TemplateFormat::Mustache, text, &ctx, &filters).unwrap(),
            "&lt;Ann&gt;"
        );
        assert_eq!(
            render_text(TemplateFormat::Plain, text, &ctx, &filters).unwrap(),
            text
        );
    }

    #[test]
    fn test_check_reports_structure_errors() {
        assert!(check(TemplateFormat::Jinja2, "{% if a %}x{% endif %}").is_ok());
        assert!(matches!(
            check(TemplateFormat::Jinja2, "{% if a %}x"),
            Err(StencilError::Syntax { .. })
        ));
        assert!(matches!(
            check(TemplateFormat::Mustache, "{{#a}}x"),
            Err(StencilError::Syntax { .. })
        ));
        assert!(check(TemplateFormat::Plain, "{{#a}}x").is_ok());
    }
}
