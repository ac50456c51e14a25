//! Implementation of the `stencil list` command.

use super::load_manager;
use crate::catalog::TemplateStore;
use crate::cli::TemplatesArgs;
use crate::config::EngineConfig;
use crate::error::Result;

/// Execute the `stencil list` command.
pub fn cmd_list(config: &EngineConfig, args: TemplatesArgs) -> Result<()> {
    let manager = load_manager(config, &args.templates)?;
    if manager.store().is_empty() {
        println!("No templates in {}", args.templates.display());
        return Ok(());
    }
    for line in list_lines(manager.store()) {
        println!("{}", line);
    }
    Ok(())
}

/// One aligned row per stored template, with a header row.
pub(crate) fn list_lines(store: &TemplateStore) -> Vec<String> {
    let id_width = store.ids().map(str::len).max().unwrap_or(0).max("ID".len());

    let mut lines = vec![format!(
        "{:<id_width$}  {:<6}  {:<8}  {:<8}  NAME",
        "ID", "LOCALE", "FORMAT", "TYPE"
    )];
    lines.extend(store.iter().map(|t| {
        format!(
            "{:<id_width$}  {:<6}  {:<8}  {:<8}  {}",
            t.id,
            t.locale,
            t.format.as_str(),
            t.template_type.as_str(),
            t.name
        )
    }));
    lines
}
