//! Implementation of the `stencil check` command.
//!
//! Parses every text of every template without rendering it, so block
//! structure errors surface before a template is ever used.

use super::load_manager;
use crate::catalog::TemplateStore;
use crate::cli::TemplatesArgs;
use crate::config::EngineConfig;
use crate::error::{Result, StencilError};
use crate::render;

/// A syntax error found in one text of one template.
#[derive(Debug)]
pub(crate) struct Problem {
    pub id: String,
    pub locale: String,
    pub field: &'static str,
    pub error: StencilError,
}

/// Execute the `stencil check` command.
pub fn cmd_check(config: &EngineConfig, args: TemplatesArgs) -> Result<()> {
    let manager = load_manager(config, &args.templates)?;
    let problems = check_store(manager.store());

    for problem in &problems {
        eprintln!(
            "{} [{}] {}: {}",
            problem.id, problem.locale, problem.field, problem.error
        );
    }

    match problems.into_iter().next() {
        None => {
            println!("{} template(s) OK", manager.store().len());
            Ok(())
        }
        Some(first) => Err(first.error),
    }
}

pub(crate) fn check_store(store: &TemplateStore) -> Vec<Problem> {
    store
        .iter()
        .flat_map(|template| {
            template.texts().filter_map(move |(field, text)| {
                render::check(template.format, text)
                    .err()
                    .map(|error| Problem {
                        id: template.id.clone(),
                        locale: template.locale.clone(),
                        field,
                        error,
                    })
            })
        })
        .collect()
}
