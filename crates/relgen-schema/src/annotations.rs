//! Free-form annotations attached to schemas, fields, and edges.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Annotation keys the resolver understands. Everything else is carried
/// verbatim for downstream consumers (templates, dialect drivers).
mod keys {
    /// Table-name override on a schema.
    pub const TABLE: &str = "table";
    /// Composite primary-key columns on an edge schema.
    pub const ID: &str = "id";
    /// Referential-action override on an edge.
    pub const ON_DELETE: &str = "on_delete";
}

/// A named map of JSON annotation values.
///
/// Annotations are opaque to the resolver except for a small set of keys
/// (`table`, `id`, `on_delete`) that influence table naming, composite
/// primary keys, and referential actions. The map is ordered so that
/// snapshot encodings are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(BTreeMap<String, Value>);

impl Annotations {
    /// Create an empty annotations map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an annotation value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// Insert an annotation value, builder style.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a raw annotation value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Check if no annotations are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all annotation entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Table-name override, if the `table` annotation is a string.
    pub fn table(&self) -> Option<&str> {
        self.get(keys::TABLE).and_then(Value::as_str)
    }

    /// Composite primary-key columns, if the `id` annotation is an array
    /// of strings.
    pub fn composite_id(&self) -> Option<Vec<String>> {
        let entries = self.get(keys::ID)?.as_array()?;
        entries
            .iter()
            .map(|v| v.as_str().map(String::from))
            .collect()
    }

    /// Referential-action override, if the `on_delete` annotation is a
    /// string. The value is parsed by the materializer.
    pub fn on_delete(&self) -> Option<&str> {
        self.get(keys::ON_DELETE).and_then(Value::as_str)
    }
}
