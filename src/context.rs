//! Layered render context.
//!
//! A [`Context`] is a stack of immutable layers. Extending a context pushes a
//! new layer onto a cheap copy of the stack, so nested renders (loop bodies,
//! section items) see the outer variables plus their own, while the outer
//! context is never modified. Lookups search from the innermost layer out.

use crate::error::{Result, StencilError};
use crate::value::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Name of the slot holding the current element inside a section.
pub const CURRENT_VALUE: &str = ".";

/// A layered, copy-on-extend mapping of variable names to values.
#[derive(Debug, Clone, Default)]
pub struct Context {
    layers: Vec<Arc<Map>>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a single layer.
    pub fn from_map(map: Map) -> Self {
        Self {
            layers: vec![Arc::new(map)],
        }
    }

    /// Build a context from a JSON object.
    ///
    /// Returns `StencilError::UserError` if `json` is not an object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match Value::from(json) {
            Value::Map(map) => Ok(Self::from_map(map)),
            Value::Null => Ok(Self::new()),
            other => Err(StencilError::UserError(format!(
                "context must be a mapping of names to values, got {}",
                other.type_name()
            ))),
        }
    }

    /// Return a new context with `vars` layered on top of this one.
    pub fn extend(&self, vars: Map) -> Context {
        let mut layers = self.layers.clone();
        if !vars.is_empty() {
            layers.push(Arc::new(vars));
        }
        Context { layers }
    }

    /// Return a new context with a single variable layered on top.
    pub fn with(&self, name: impl Into<String>, value: impl Into<Value>) -> Context {
        let mut vars = Map::new();
        vars.insert(name.into(), value.into());
        self.extend(vars)
    }

    /// Look up a top-level name, innermost layer first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.layers.iter().rev().find_map(|layer| layer.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All visible names.
    pub fn names(&self) -> BTreeSet<String> {
        self.layers
            .iter()
            .flat_map(|layer| layer.keys().cloned())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.is_empty())
    }

    /// Collapse all layers into a single mapping, inner layers winning.
    pub fn flatten(&self) -> Map {
        let mut merged = Map::new();
        for layer in &self.layers {
            for (name, value) in layer.iter() {
                merged.insert(name.clone(), value.clone());
            }
        }
        merged
    }
}

impl From<Map> for Context {
    fn from(map: Map) -> Self {
        Context::from_map(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Context::from_map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extend_does_not_touch_outer() {
        let outer: Context = [("name", "outer")].into_iter().collect();
        let inner = outer.with("name", "inner").with("extra", 1);

        assert_eq!(inner.get("name"), Some(&Value::from("inner")));
        assert_eq!(inner.get("extra"), Some(&Value::Int(1)));
        assert_eq!(outer.get("name"), Some(&Value::from("outer")));
        assert!(!outer.contains("extra"));
    }

    #[test]
    fn test_flatten_prefers_inner_layers() {
        let ctx = Context::from_json(json!({"a": 1, "b": 2}))
            .unwrap()
            .with("b", 3);
        let flat = ctx.flatten();
        assert_eq!(flat.get("a"), Some(&Value::Int(1)));
        assert_eq!(flat.get("b"), Some(&Value::Int(3)));
        assert_eq!(ctx.names().len(), 2);
    }

    #[test]
    fn test_from_json_rejects_scalars() {
        assert!(Context::from_json(json!([1, 2])).is_err());
        assert!(Context::from_json(json!(null)).unwrap().is_empty());
    }

    #[test]
    fn test_empty_extend_adds_no_layer() {
        let ctx = Context::new().extend(Map::new());
        assert!(ctx.is_empty());
        assert_eq!(ctx.get("anything"), None);
    }
}
