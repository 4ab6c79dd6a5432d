use crate::container::Container;
use crate::errors::ContainerError;
use crate::reference::Argument;
use crate::registry::{Arguments, ResolvedArgument};

/// Names of the services currently under construction, outermost first
#[derive(Debug, Clone, Default)]
pub struct ResolutionPath {
    services: Vec<String>,
}

impl ResolutionPath {
    /// Create a new resolution path
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service to the resolution path
    pub fn push(&mut self, service: impl Into<String>) {
        self.services.push(service.into());
    }

    /// Remove the last service from the resolution path
    pub fn pop(&mut self) -> Option<String> {
        self.services.pop()
    }

    /// Check if the path contains a service (for cycle detection)
    pub fn contains(&self, service: &str) -> bool {
        self.services.iter().any(|s| s == service)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Get the path as a string for error messages
    pub fn path_string(&self) -> String {
        self.services.join(" -> ")
    }

    /// The path as it would read with `next` appended
    pub fn path_with(&self, next: &str) -> String {
        if self.services.is_empty() {
            next.to_string()
        } else {
            format!("{} -> {}", self.path_string(), next)
        }
    }
}

/// Substitutes references in an argument list, in input order
pub(crate) struct ArgumentResolver<'c> {
    container: &'c Container,
}

impl<'c> ArgumentResolver<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self { container }
    }

    /// Resolve `definitions` for the service `owner`.
    ///
    /// Service references are built through the container, which may construct
    /// further services; the first failure aborts the remaining arguments.
    pub(crate) fn resolve_arguments(
        &self,
        owner: &str,
        definitions: &[Argument],
        path: &mut ResolutionPath,
    ) -> Result<Arguments, ContainerError> {
        let mut values = Vec::with_capacity(definitions.len());

        for definition in definitions {
            let value = match definition {
                Argument::Service { service } => {
                    if service.name() == owner {
                        return Err(ContainerError::CircularReference {
                            service: owner.to_string(),
                            path: path.path_with(owner),
                        });
                    }

                    ResolvedArgument::Service(self.container.resolve_service(service.name(), path)?)
                }
                Argument::Parameter { parameter } => {
                    ResolvedArgument::Value(self.container.get_parameter(parameter.name())?.clone())
                }
                Argument::Literal(value) => ResolvedArgument::Value(value.clone()),
            };
            values.push(value);
        }

        Ok(Arguments::new(owner, values))
    }
}
