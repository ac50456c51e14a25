//! Implementation of the `stencil render` and `stencil preview` commands.

use super::{load_manager, read_context};
use crate::cli::{PreviewArgs, RenderArgs};
use crate::config::EngineConfig;
use crate::error::{Result, StencilError};
use crate::template::RenderedTemplate;

/// Execute the `stencil render` command.
pub fn cmd_render(config: &EngineConfig, args: RenderArgs) -> Result<()> {
    let manager = load_manager(config, &args.source.templates)?;
    let context = read_context(args.context.as_deref())?;
    let rendered = manager.render(&args.id, &context, args.locale.as_deref())?;
    print_rendered(&rendered, args.json)
}

/// Execute the `stencil preview` command.
pub fn cmd_preview(config: &EngineConfig, args: PreviewArgs) -> Result<()> {
    let manager = load_manager(config, &args.source.templates)?;
    let rendered = manager.preview(&args.id, args.locale.as_deref())?;
    print_rendered(&rendered, args.json)
}

fn print_rendered(rendered: &RenderedTemplate, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(rendered)
            .map_err(|e| StencilError::UserError(format!("failed to serialize result: {}", e)))?;
        println!("{}", out);
    } else {
        print!("{}", format_rendered(rendered));
    }
    Ok(())
}

/// Human-readable form of a render result.
pub(crate) fn format_rendered(rendered: &RenderedTemplate) -> String {
    let mut out = String::new();
    if let Some(subject) = &rendered.subject {
        out.push_str(&format!("Subject: {}\n\n", subject));
    }
    out.push_str(&rendered.body);
    out.push('\n');
    if let Some(html) = &rendered.html_body {
        out.push_str("\n--- html ---\n");
        out.push_str(html);
        out.push('\n');
    }
    out
}
