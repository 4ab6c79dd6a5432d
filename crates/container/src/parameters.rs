use serde_json::{Map, Value};

use crate::errors::ContainerError;

/// Separator between the segments of a parameter path
pub const PATH_SEPARATOR: char = '.';

/// Nested, read-only parameter table addressed by dotted paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    root: Map<String, Value>,
}

impl Parameters {
    /// Create an empty parameter table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parameter table from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, ContainerError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ContainerError::InvalidParameters {
                message: format!("expected an object at the root, found {}", kind_of(&other)),
            }),
        }
    }

    /// Resolve a dotted path such as `group.param`.
    ///
    /// Every segment must name a key of the mapping reached so far. The value
    /// found after the last segment is returned as-is, so a path may stop at a
    /// nested mapping. Keys holding `null` count as undefined.
    pub fn resolve(&self, path: &str) -> Result<&Value, ContainerError> {
        let mut segments = path.split(PATH_SEPARATOR);

        // split always yields at least one segment
        let first = segments.next().unwrap_or_default();
        let mut context =
            lookup(&self.root, first).ok_or_else(|| ContainerError::parameter_not_found(path))?;

        for segment in segments {
            context = match context {
                Value::Object(map) => lookup(map, segment),
                _ => None,
            }
            .ok_or_else(|| ContainerError::parameter_not_found(path))?;
        }

        Ok(context)
    }

    /// Check whether `resolve` would succeed for the path
    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    /// Check whether the table has no top-level entries
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// The underlying root mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(root: Map<String, Value>) -> Self {
        Self { root }
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
