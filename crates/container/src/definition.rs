use serde::{Deserialize, Serialize};

use crate::reference::Argument;

/// Recipe for one service: which registered target to construct, with which
/// arguments, and which initializer methods to call on the fresh instance.
///
/// `target` is optional so that definitions produced by an outside loader can
/// be handed over as-is; an entry without a target is rejected when the
/// service is built or validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    #[serde(default, alias = "class")]
    pub target: Option<String>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub calls: Vec<CallDefinition>,
}

impl ServiceDefinition {
    /// Create a definition for the given target identifier
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            arguments: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Append a constructor argument
    pub fn argument(mut self, argument: impl Into<Argument>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Replace the constructor arguments
    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Append a post-construction call
    pub fn call(mut self, call: CallDefinition) -> Self {
        self.calls.push(call);
        self
    }

    /// Every argument of the definition, constructor arguments first
    pub fn all_arguments(&self) -> impl Iterator<Item = &Argument> {
        self.arguments
            .iter()
            .chain(self.calls.iter().flat_map(|call| call.arguments.iter()))
    }

    /// Names of the services this definition references
    pub fn service_references(&self) -> impl Iterator<Item = &str> {
        self.all_arguments()
            .filter_map(Argument::as_service_reference)
            .map(|reference| reference.name())
    }
}

/// A method call performed on a service right after construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallDefinition {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl CallDefinition {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            arguments: Vec::new(),
        }
    }

    /// Append a call argument
    pub fn argument(mut self, argument: impl Into<Argument>) -> Self {
        self.arguments.push(argument.into());
        self
    }
}
