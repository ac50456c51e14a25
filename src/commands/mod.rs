//! Command implementations for stencil.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the loading helpers they share.

mod check;
mod list;
mod render;

#[cfg(test)]
mod tests;

use crate::catalog::TemplateManager;
use crate::cli::{Cli, Command};
use crate::config::EngineConfig;
use crate::context::Context;
use crate::engine::Engine;
use crate::error::{Result, StencilError};
use std::io::Read;
use std::path::Path;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Render(args) => render::cmd_render(&config, args),
        Command::Preview(args) => render::cmd_preview(&config, args),
        Command::List(args) => list::cmd_list(&config, args),
        Command::Check(args) => check::cmd_check(&config, args),
        Command::Filters => cmd_filters(&config),
    }
}

/// Execute the `stencil filters` command.
fn cmd_filters(config: &EngineConfig) -> Result<()> {
    for name in Engine::with_config(config).filter_names() {
        println!("{}", name);
    }
    Ok(())
}

// ============================================================================
// Shared loading helpers
// ============================================================================

/// Load the engine config, or defaults when no file is given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

/// A manager holding every template in `dir`.
pub(crate) fn load_manager(config: &EngineConfig, dir: &Path) -> Result<TemplateManager> {
    let mut manager = TemplateManager::with_config(config);
    let count = manager.load_dir(dir)?;
    tracing::debug!(count, dir = %dir.display(), "loaded templates");
    Ok(manager)
}

/// Read a render context from a JSON or YAML file, or stdin for `-`.
pub(crate) fn read_context(path: Option<&Path>) -> Result<Context> {
    let Some(path) = path else {
        return Ok(Context::new());
    };

    let (label, content) = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| StencilError::UserError(format!("failed to read context from stdin: {}", e)))?;
        ("stdin".to_string(), buf)
    } else {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StencilError::UserError(format!(
                "failed to read context file '{}': {}",
                path.display(),
                e
            ))
        })?;
        (path.display().to_string(), content)
    };

    parse_context(&label, &content)
}

/// Parse context text as JSON, falling back to YAML.
pub(crate) fn parse_context(label: &str, content: &str) -> Result<Context> {
    if content.trim().is_empty() {
        return Ok(Context::new());
    }

    let data: serde_json::Value = match serde_json::from_str(content) {
        Ok(data) => data,
        Err(_) => serde_yaml::from_str(content).map_err(|e| {
            StencilError::UserError(format!("failed to parse context '{}': {}", label, e))
        })?,
    };
    Context::from_json(data)
}
