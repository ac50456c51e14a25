//! Named filters applied in expression pipelines.
//!
//! A filter is a pure function from a value and its literal arguments to a
//! new value. Filters live in a [`FilterRegistry`] owned by the engine;
//! looking up a name that is not registered is a no-op, and a filter that
//! fails (bad arguments, unsupported input) is skipped with a warning so the
//! value flows through unchanged.

mod builtins;


use crate::config::FilterDefaults;
use crate::expr::FilterCall;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub use builtins::escape_html;

/// Failure inside a single filter invocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Wrong number of arguments.
    #[error("filter '{filter}' expects {expected} argument(s), got {got}")]
    Arity {
        filter: String,
        expected: &'static str,
        got: usize,
    },

    /// The input value has a type the filter cannot handle.
    #[error("filter '{filter}' cannot be applied to {found} value '{value}'")]
    Unsupported {
        filter: String,
        found: String,
        value: String,
    },

    /// An argument has the wrong type or is otherwise invalid.
    #[error("filter '{filter}': {message}")]
    InvalidArgument { filter: String, message: String },
}

impl FilterError {
    pub fn unsupported(filter: &str, value: &Value) -> Self {
        FilterError::Unsupported {
            filter: filter.to_string(),
            found: value.type_name().to_string(),
            value: value.to_string(),
        }
    }

    pub fn invalid_argument(filter: &str, message: impl Into<String>) -> Self {
        FilterError::InvalidArgument {
            filter: filter.to_string(),
            message: message.into(),
        }
    }
}

/// Signature shared by built-in and caller-registered filters.
pub type FilterFn = dyn Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync;

/// A set of named filters.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: BTreeMap<String, Arc<FilterFn>>,
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in filters configured by `defaults`.
    pub fn with_builtins(defaults: &FilterDefaults) -> Self {
        let mut registry = Self::new();
        builtins::register(&mut registry, defaults);
        registry
    }

    /// Register (or replace) a filter under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FilterFn>> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered filter names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.filters.keys().map(String::as_str).collect()
    }

    /// Apply one pipeline step.
    ///
    /// Unknown filters, unparseable arguments, and filter errors all leave
    /// `value` unchanged.
    pub fn apply(&self, value: Value, call: &FilterCall) -> Value {
        let Some(filter) = self.filters.get(&call.name) else {
            tracing::debug!(filter = %call.name, "unknown filter, passing value through");
            return value;
        };

        let args = match &call.args {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(filter = %call.name, error = %e, "skipping filter with invalid arguments");
                return value;
            }
        };

        match filter(&value, args) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(filter = %call.name, error = %e, "skipping failed filter");
                value
            }
        }
    }
}

/// Check the argument count is within `min..=max`.
pub(crate) fn expect_args(
    filter: &str,
    args: &[Value],
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<(), FilterError> {
    if args.len() < min || args.len() > max {
        return Err(FilterError::Arity {
            filter: filter.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}
