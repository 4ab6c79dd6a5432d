//! Argument values used inside service definitions.
//!
//! An argument list mixes plain literals with markers that ask the container to
//! substitute something at construction time: a [`ServiceReference`] is replaced
//! by the fully built service of that name, a [`ParameterReference`] by the
//! parameter found at its dotted path.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Marker for "substitute the service with this name"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceReference {
    name: String,
}

impl ServiceReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The referenced service name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Marker for "substitute the parameter at this dotted path"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterReference {
    name: String,
}

impl ParameterReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The referenced parameter path
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One entry of a constructor or call argument list.
///
/// Serialized as `{"service": "name"}`, `{"parameter": "path"}` or the bare
/// literal value. Only an object whose sole key is `service` or `parameter`
/// with a string value reads back as a reference; anything else, extra keys
/// included, stays a literal. A literal that is itself shaped like
/// `{"service": "name"}` can only be built in code with `Argument::Literal`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Argument {
    Service {
        service: ServiceReference,
    },
    Parameter {
        parameter: ParameterReference,
    },
    Literal(Value),
}

impl Argument {
    /// Reference to another service
    pub fn service(name: impl Into<String>) -> Self {
        Self::Service {
            service: ServiceReference::new(name),
        }
    }

    /// Reference to a parameter path
    pub fn parameter(path: impl Into<String>) -> Self {
        Self::Parameter {
            parameter: ParameterReference::new(path),
        }
    }

    /// Literal value passed through unchanged
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Name of the referenced service, if this is a service reference
    pub fn as_service_reference(&self) -> Option<&ServiceReference> {
        match self {
            Self::Service { service } => Some(service),
            _ => None,
        }
    }

    /// Path of the referenced parameter, if this is a parameter reference
    pub fn as_parameter_reference(&self) -> Option<&ParameterReference> {
        match self {
            Self::Parameter { parameter } => Some(parameter),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Argument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        let reference = match &value {
            Value::Object(map) if map.len() == 1 => match map.iter().next() {
                Some((key, Value::String(name))) if key == "service" => {
                    Some(Self::service(name.as_str()))
                }
                Some((key, Value::String(path))) if key == "parameter" => {
                    Some(Self::parameter(path.as_str()))
                }
                _ => None,
            },
            _ => None,
        };

        Ok(reference.unwrap_or(Self::Literal(value)))
    }
}

impl From<ServiceReference> for Argument {
    fn from(service: ServiceReference) -> Self {
        Self::Service { service }
    }
}

impl From<ParameterReference> for Argument {
    fn from(parameter: ParameterReference) -> Self {
        Self::Parameter { parameter }
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::Literal(Value::from(value))
    }
}
