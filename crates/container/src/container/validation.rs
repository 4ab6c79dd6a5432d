use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::definition::ServiceDefinition;
use crate::errors::ContainerError;
use crate::parameters::Parameters;
use crate::registry::TypeRegistry;

/// Problems found in a definition table without constructing anything
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{service} service entry must contain a 'target' key")]
    MissingTarget { service: String },

    #[error("{service} service class does not exist: {target}")]
    UnknownTarget { service: String, target: String },

    #[error("{service} service call #{index} must contain a 'method' key")]
    MissingMethod { service: String, index: usize },

    #[error("{service} service asks for call to uncallable method: {method}")]
    UncallableMethod { service: String, method: String },

    #[error("{service} service references undefined service: {dependency}")]
    MissingService { service: String, dependency: String },

    #[error("{service} service references undefined parameter: {path}")]
    MissingParameter { service: String, path: String },

    #[error("Circular reference detected: {}", .cycle.join(" -> "))]
    CircularReference { cycle: Vec<String> },
}

impl ValidationError {
    /// Convert to the error `get` would raise for the same defect
    pub fn to_container_error(&self) -> ContainerError {
        match self {
            ValidationError::MissingTarget { service } => ContainerError::MissingTarget {
                service: service.clone(),
            },
            ValidationError::UnknownTarget { service, target } => ContainerError::UnknownTarget {
                service: service.clone(),
                target: target.clone(),
            },
            ValidationError::MissingMethod { service, .. } => ContainerError::MissingMethod {
                service: service.clone(),
            },
            ValidationError::UncallableMethod { service, method } => {
                ContainerError::UncallableMethod {
                    service: service.clone(),
                    method: method.clone(),
                }
            }
            ValidationError::MissingService { dependency, .. } => {
                ContainerError::service_not_found(dependency.clone())
            }
            ValidationError::MissingParameter { path, .. } => {
                ContainerError::parameter_not_found(path.clone())
            }
            ValidationError::CircularReference { cycle } => ContainerError::CircularReference {
                service: cycle.first().cloned().unwrap_or_default(),
                path: cycle.join(" -> "),
            },
        }
    }
}

/// Checks a whole definition table against the registered types and parameters
#[derive(Debug)]
pub struct DefinitionValidator<'a> {
    definitions: &'a HashMap<String, ServiceDefinition>,
    types: &'a TypeRegistry,
    parameters: &'a Parameters,
}

impl<'a> DefinitionValidator<'a> {
    pub fn new(
        definitions: &'a HashMap<String, ServiceDefinition>,
        types: &'a TypeRegistry,
        parameters: &'a Parameters,
    ) -> Self {
        Self {
            definitions,
            types,
            parameters,
        }
    }

    /// Run every check; errors are ordered by service name
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for name in self.sorted_names() {
            let definition = &self.definitions[name];
            errors.extend(self.validate_definition(name, definition));
            errors.extend(self.validate_references(name, definition));
        }
        errors.extend(self.validate_circular_references());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn sorted_names(&self) -> Vec<&'a str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Target and call checks
    fn validate_definition(
        &self,
        name: &str,
        definition: &ServiceDefinition,
    ) -> Vec<ValidationError> {
        let Some(target_name) = definition.target.as_deref() else {
            return vec![ValidationError::MissingTarget {
                service: name.to_string(),
            }];
        };

        let Some(target) = self.types.get(target_name) else {
            return vec![ValidationError::UnknownTarget {
                service: name.to_string(),
                target: target_name.to_string(),
            }];
        };

        let mut errors = Vec::new();
        for (index, call) in definition.calls.iter().enumerate() {
            match call.method.as_deref() {
                None => errors.push(ValidationError::MissingMethod {
                    service: name.to_string(),
                    index,
                }),
                Some(method) if !target.has_method(method) => {
                    errors.push(ValidationError::UncallableMethod {
                        service: name.to_string(),
                        method: method.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        errors
    }

    /// Every referenced service must be defined and every parameter present
    fn validate_references(
        &self,
        name: &str,
        definition: &ServiceDefinition,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for argument in definition.all_arguments() {
            if let Some(reference) = argument.as_service_reference() {
                if !self.definitions.contains_key(reference.name()) {
                    errors.push(ValidationError::MissingService {
                        service: name.to_string(),
                        dependency: reference.name().to_string(),
                    });
                }
            } else if let Some(reference) = argument.as_parameter_reference() {
                if !self.parameters.exists(reference.name()) {
                    errors.push(ValidationError::MissingParameter {
                        service: name.to_string(),
                        path: reference.name().to_string(),
                    });
                }
            }
        }

        errors
    }

    fn validate_circular_references(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut visited = HashSet::new();
        let mut in_progress = HashSet::new();

        for name in self.sorted_names() {
            if !visited.contains(name) {
                let mut path = Vec::new();
                self.detect_cycle(name, &mut visited, &mut in_progress, &mut path, &mut errors);
            }
        }

        errors
    }

    /// DFS-based cycle detection over service references
    fn detect_cycle(
        &self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        in_progress: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
        errors: &mut Vec<ValidationError>,
    ) {
        if in_progress.contains(name) {
            let start = path.iter().position(|entry| *entry == name).unwrap_or(0);
            let mut cycle: Vec<String> =
                path[start..].iter().map(|entry| entry.to_string()).collect();
            cycle.push(name.to_string());
            errors.push(ValidationError::CircularReference { cycle });
            return;
        }

        if visited.contains(name) {
            return;
        }

        let Some(definition) = self.definitions.get(name) else {
            // reported by validate_references
            return;
        };

        in_progress.insert(name);
        path.push(name);

        for dependency in definition.service_references() {
            if let Some((key, _)) = self.definitions.get_key_value(dependency) {
                self.detect_cycle(key.as_str(), visited, in_progress, path, errors);
            }
        }

        path.pop();
        in_progress.remove(name);
        visited.insert(name);
    }
}
