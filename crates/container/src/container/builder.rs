use std::collections::HashMap;

use serde_json::Value;

use crate::config::ContainerConfig;
use crate::container::Container;
use crate::definition::ServiceDefinition;
use crate::errors::ContainerError;
use crate::parameters::Parameters;
use crate::registry::TypeRegistry;

/// Builder for constructing containers from definitions, parameters and types
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    definitions: HashMap<String, ServiceDefinition>,
    parameters: Parameters,
    types: TypeRegistry,
    config: ContainerConfig,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a service. A later definition with the same name replaces it.
    pub fn service(mut self, name: impl Into<String>, definition: ServiceDefinition) -> Self {
        self.definitions.insert(name.into(), definition);
        self
    }

    /// Define several services at once
    pub fn services<I, N>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = (N, ServiceDefinition)>,
        N: Into<String>,
    {
        self.definitions
            .extend(definitions.into_iter().map(|(name, definition)| (name.into(), definition)));
        self
    }

    /// Set the parameter table
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the parameter table from a JSON object
    pub fn parameter_values(self, value: Value) -> Result<Self, ContainerError> {
        Ok(self.parameters(Parameters::from_value(value)?))
    }

    /// Set the type registry
    pub fn types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Register types through a closure
    pub fn configure_types<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut TypeRegistry),
    {
        configure(&mut self.types);
        self
    }

    /// Set the container configuration
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the container.
    ///
    /// Fails on an invalid configuration and, when `validate_on_build` is set,
    /// on the first definition problem found by validation.
    pub fn build(self) -> Result<Container, ContainerError> {
        self.config.validate()?;
        let validate = self.config.validate_on_build;

        let container =
            Container::with_config(self.definitions, self.parameters, self.types, self.config);

        if validate {
            tracing::info!("Validating {} service definition(s)", container.service_count());
            if let Err(errors) = container.validate() {
                for error in &errors {
                    tracing::warn!("Invalid service definition: {}", error);
                }
                if let Some(first) = errors.first() {
                    return Err(first.to_container_error());
                }
            }
        }

        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Argument;
    use serde_json::json;

    fn types(registry: &mut TypeRegistry) {
        registry.register("Text", |args| args.string(0));
    }

    #[test]
    fn test_builder_assembles_container() {
        let container = ContainerBuilder::new()
            .service(
                "greeting",
                ServiceDefinition::new("Text").argument(Argument::parameter("app.greeting")),
            )
            .services(vec![("farewell", ServiceDefinition::new("Text").argument("bye"))])
            .parameter_values(json!({"app": {"greeting": "hello"}}))
            .unwrap()
            .configure_types(types)
            .build()
            .unwrap();

        assert_eq!(container.service_count(), 2);
        assert_eq!(*container.get_as::<String>("greeting").unwrap(), "hello");
        assert_eq!(*container.get_as::<String>("farewell").unwrap(), "bye");
    }

    #[test]
    fn test_build_validates_when_configured() {
        let builder = || {
            ContainerBuilder::new()
                .service("broken", ServiceDefinition::new("Missing"))
                .configure_types(types)
        };

        assert!(builder().build().is_ok());

        let err = builder().config(ContainerConfig::testing()).build().unwrap_err();
        assert!(matches!(err, ContainerError::UnknownTarget { .. }));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let err = ContainerBuilder::new()
            .config(ContainerConfig::new().with_max_resolution_depth(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ContainerError::Configuration(_)));
    }

    #[test]
    fn test_parameter_values_require_object() {
        assert!(ContainerBuilder::new().parameter_values(json!("flat")).is_err());
    }
}
