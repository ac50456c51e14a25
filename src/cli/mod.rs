//! CLI argument parsing for stencil.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Stencil: render Jinja-like and Mustache-like text templates.
///
/// Templates are YAML files in a directory, one template per file. Contexts
/// are JSON or YAML mappings of variable names to values.
#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Engine configuration file (YAML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for stencil.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a template with a context.
    ///
    /// Prints the subject, body, and HTML body. Fails if a required
    /// variable is missing or a template text is malformed.
    Render(RenderArgs),

    /// Render a template with example values.
    ///
    /// Each declared variable gets its example, else its default, else a
    /// `[name]` placeholder.
    Preview(PreviewArgs),

    /// List the templates in a directory.
    List(TemplatesArgs),

    /// Parse every template text and report syntax errors.
    Check(TemplatesArgs),

    /// List the registered filter names.
    Filters,
}

/// Location of the template directory.
#[derive(Parser, Debug)]
pub struct TemplatesArgs {
    /// Directory containing `*.yaml`/`*.yml` template files.
    #[arg(short, long, default_value = "templates")]
    pub templates: PathBuf,
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Template id (e.g., email.welcome).
    pub id: String,

    #[command(flatten)]
    pub source: TemplatesArgs,

    /// Context file (JSON or YAML); `-` reads from stdin.
    #[arg(short, long)]
    pub context: Option<PathBuf>,

    /// Locale to render (fallbacks apply).
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `preview` command.
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Template id (e.g., email.welcome).
    pub id: String,

    #[command(flatten)]
    pub source: TemplatesArgs,

    /// Locale to render (fallbacks apply).
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
