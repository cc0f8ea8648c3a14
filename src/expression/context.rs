// SPDX-License-Identifier: MIT

//! Read-only evaluation context

use serde_json::{Map, Value as Json};

use super::value::Value;
use crate::error::PermitError;

/// Variables an expression is evaluated against, e.g. `user`, `entity`,
/// `authenticated`. Evaluation only ever reads from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: Map<String, Json>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: Json) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a top-level variable
    pub fn insert(&mut self, key: impl Into<String>, value: Json) {
        self.vars.insert(key.into(), value);
    }

    /// Get a top-level variable
    pub fn get(&self, key: &str) -> Option<&Json> {
        self.vars.get(key)
    }

    /// Resolve a dotted path (e.g. `"user.role"`)
    ///
    /// Objects are indexed by key, arrays by a decimal index or `length`.
    /// Anything else on the way, or a missing segment, yields
    /// [`Value::Undefined`].
    pub fn resolve(&self, path: &str) -> Value<'_> {
        let mut segments = path.split('.');
        let Some(root) = segments.next().and_then(|first| self.vars.get(first)) else {
            return Value::Undefined;
        };

        let mut current = Value::from_json(root);
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment).map_or(Value::Undefined, Value::from_json),
                Value::Array(items) if segment == "length" => Value::Number(items.len() as f64),
                Value::Array(items) => array_index(segment)
                    .and_then(|i| items.get(i))
                    .map_or(Value::Undefined, Value::from_json),
                _ => Value::Undefined,
            };
            if matches!(current, Value::Undefined) {
                break;
            }
        }
        current
    }
}

/// Canonical decimal indices only: `"01"` or `"+1"` do not index an array
fn array_index(segment: &str) -> Option<usize> {
    let index: usize = segment.parse().ok()?;
    (index.to_string() == segment).then_some(index)
}

impl From<Map<String, Json>> for Context {
    fn from(vars: Map<String, Json>) -> Self {
        Self { vars }
    }
}

impl TryFrom<Json> for Context {
    type Error = PermitError;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        match value {
            Json::Object(vars) => Ok(Self { vars }),
            Json::Null => Ok(Self::new()),
            other => Err(PermitError::context(format!(
                "expected a JSON object, got {}",
                Value::from_json(&other).type_name()
            ))),
        }
    }
}
