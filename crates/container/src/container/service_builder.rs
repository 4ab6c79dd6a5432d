use crate::container::resolver::{ArgumentResolver, ResolutionPath};
use crate::container::Container;
use crate::definition::{CallDefinition, ServiceDefinition};
use crate::errors::ContainerError;
use crate::registry::{ServiceInstance, SharedService, TargetType};

/// Builds one service from its definition
pub(crate) struct ServiceBuilder<'c> {
    container: &'c Container,
    arguments: ArgumentResolver<'c>,
}

impl<'c> ServiceBuilder<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self {
            container,
            arguments: ArgumentResolver::new(container),
        }
    }

    /// Validate the definition, construct the instance and run its calls.
    ///
    /// The instance is only shared once every call has succeeded.
    pub(crate) fn build(
        &self,
        name: &str,
        definition: &ServiceDefinition,
        path: &mut ResolutionPath,
    ) -> Result<SharedService, ContainerError> {
        let target_name = definition.target.as_deref().ok_or_else(|| ContainerError::MissingTarget {
            service: name.to_string(),
        })?;

        let target = self.container.types().get(target_name).ok_or_else(|| {
            ContainerError::UnknownTarget {
                service: name.to_string(),
                target: target_name.to_string(),
            }
        })?;

        let arguments = self
            .arguments
            .resolve_arguments(name, &definition.arguments, path)?;

        tracing::debug!(
            "Constructing service '{}' as {} with {} argument(s)",
            name,
            target.type_name(),
            arguments.len()
        );
        let mut instance = target.construct(&arguments)?;

        for call in &definition.calls {
            self.initialize(name, target, &mut instance, call, path)?;
        }

        Ok(SharedService::from(instance))
    }

    fn initialize(
        &self,
        name: &str,
        target: &TargetType,
        instance: &mut ServiceInstance,
        call: &CallDefinition,
        path: &mut ResolutionPath,
    ) -> Result<(), ContainerError> {
        let method_name = call.method.as_deref().ok_or_else(|| ContainerError::MissingMethod {
            service: name.to_string(),
        })?;

        let method = target.method(method_name).ok_or_else(|| ContainerError::UncallableMethod {
            service: name.to_string(),
            method: method_name.to_string(),
        })?;

        let arguments = self.arguments.resolve_arguments(name, &call.arguments, path)?;

        tracing::trace!("Calling '{}' on service '{}'", method_name, name);
        method(instance.as_mut(), &arguments)
    }
}
