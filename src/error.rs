//! Error types for stencil.
//!
//! Uses thiserror for derive macros. Unresolvable variable paths are not
//! errors (they render as empty text) and filter failures are handled inside
//! the filter pipeline, so everything here aborts a render as a whole.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for stencil operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StencilError {
    /// The merged context lacks one or more declared-required variables.
    #[error("missing required variables for template '{template_id}': {}", .names.join(", "))]
    MissingRequiredVariables {
        /// Template that was being rendered.
        template_id: String,
        /// The absent names, sorted.
        names: Vec<String>,
    },

    /// A relational comparison could not coerce an operand to a number.
    #[error("cannot compare '{operand}' as a number in condition '{expression}'")]
    NumericCoercion {
        /// The full condition text.
        expression: String,
        /// The operand text that failed to parse.
        operand: String,
    },

    /// Malformed block structure in template text.
    #[error("template syntax error at byte {position}: {message}")]
    Syntax {
        /// Human-readable description.
        message: String,
        /// Byte offset of the offending tag in the template text.
        position: usize,
    },

    /// No template registered for the id, even after locale fallback.
    #[error("template not found: {id} (locale '{locale}')")]
    TemplateNotFound {
        /// Requested template id.
        id: String,
        /// Locale that was looked up.
        locale: String,
    },

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Bad arguments or unreadable input.
    #[error("{0}")]
    UserError(String),
}

impl StencilError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            StencilError::MissingRequiredVariables { .. } => exit_codes::RENDER_FAILURE,
            StencilError::NumericCoercion { .. } => exit_codes::RENDER_FAILURE,
            StencilError::Syntax { .. } => exit_codes::RENDER_FAILURE,
            StencilError::TemplateNotFound { .. } => exit_codes::NOT_FOUND,
            StencilError::Config(_) => exit_codes::USER_ERROR,
            StencilError::UserError(_) => exit_codes::USER_ERROR,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, position: usize) -> Self {
        StencilError::Syntax {
            message: message.into(),
            position,
        }
    }
}

/// Result type alias for stencil operations.
pub type Result<T> = std::result::Result<T, StencilError>;
