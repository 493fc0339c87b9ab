// SPDX-License-Identifier: MIT

//! Per-invocation bindings for chain evaluation

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Name-to-value bindings visible to steps and the final expression
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    /// Create an empty Environment
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an Environment from the entries of a JSON object.
    ///
    /// Non-object values produce an empty environment.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(obj) => obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Self::empty(),
        }
    }

    /// Bind a name, replacing any earlier binding of the same name
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Get a bound value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Get a nested value using dot notation (e.g., "order.total")
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.bindings.get(parts.next()?)?;
        for part in parts {
            current = lookup(current, part)?;
        }
        Some(current)
    }

    /// Check whether a name is bound
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Get all bound names
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.bindings.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.bindings.iter()
    }

    /// Snapshot the bindings as a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.bindings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl FromIterator<(String, Value)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, Value)> for Environment {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.bindings.extend(iter);
    }
}

/// Step one segment into a value: object key, or array index
pub(crate) fn lookup<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(obj) => obj.get(segment),
        Value::Array(arr) => segment.parse::<usize>().ok().and_then(|i| arr.get(i)),
        _ => None,
    }
}
