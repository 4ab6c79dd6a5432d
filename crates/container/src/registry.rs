use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ContainerError;

/// A constructed service as held by the container and its dependents
pub type SharedService = Arc<dyn Any + Send + Sync>;

/// A freshly constructed service, still exclusively owned by the builder
pub type ServiceInstance = Box<dyn Any + Send + Sync>;

/// Factory turning resolved arguments into a new instance
pub type Constructor =
    Box<dyn Fn(&Arguments) -> Result<ServiceInstance, ContainerError> + Send + Sync>;

/// Initializer invoked by a call definition on the fresh instance
pub type Initializer = Box<
    dyn Fn(&mut (dyn Any + Send + Sync), &Arguments) -> Result<(), ContainerError> + Send + Sync,
>;

/// An argument after references have been substituted
#[derive(Clone)]
pub enum ResolvedArgument {
    Value(Value),
    Service(SharedService),
}

impl std::fmt::Debug for ResolvedArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedArgument::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ResolvedArgument::Service(_) => f.debug_tuple("Service").field(&"<service>").finish(),
        }
    }
}

/// Resolved argument list handed to constructors and initializers.
///
/// Accessors report mismatches as [`ContainerError::InvalidArgument`] naming
/// the service being built and the argument position.
#[derive(Debug, Clone)]
pub struct Arguments {
    service: String,
    values: Vec<ResolvedArgument>,
}

impl Arguments {
    pub fn new(service: impl Into<String>, values: Vec<ResolvedArgument>) -> Self {
        Self {
            service: service.into(),
            values,
        }
    }

    /// Name of the service these arguments were resolved for
    pub fn service_name(&self) -> &str {
        &self.service
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw access to the argument at `index`
    pub fn get(&self, index: usize) -> Result<&ResolvedArgument, ContainerError> {
        self.values.get(index).ok_or_else(|| {
            ContainerError::invalid_argument(
                &self.service,
                index,
                format!("missing argument, {} supplied", self.values.len()),
            )
        })
    }

    /// The service injected at `index`, downcast to `T`
    pub fn service<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, ContainerError> {
        match self.get(index)? {
            ResolvedArgument::Service(service) => service.clone().downcast::<T>().map_err(|_| {
                ContainerError::invalid_argument(
                    &self.service,
                    index,
                    format!("expected a service of type {}", std::any::type_name::<T>()),
                )
            }),
            ResolvedArgument::Value(_) => Err(ContainerError::invalid_argument(
                &self.service,
                index,
                "expected a service, found a value",
            )),
        }
    }

    /// The literal or parameter value at `index`
    pub fn value(&self, index: usize) -> Result<&Value, ContainerError> {
        match self.get(index)? {
            ResolvedArgument::Value(value) => Ok(value),
            ResolvedArgument::Service(_) => Err(ContainerError::invalid_argument(
                &self.service,
                index,
                "expected a value, found a service",
            )),
        }
    }

    /// The string value at `index`
    pub fn str(&self, index: usize) -> Result<&str, ContainerError> {
        self.value(index)?.as_str().ok_or_else(|| {
            ContainerError::invalid_argument(&self.service, index, "expected a string")
        })
    }

    /// The string value at `index`, owned
    pub fn string(&self, index: usize) -> Result<String, ContainerError> {
        self.str(index).map(str::to_string)
    }

    /// Deserialize the value at `index` into `T`
    pub fn deserialize<T: DeserializeOwned>(&self, index: usize) -> Result<T, ContainerError> {
        serde_json::from_value(self.value(index)?.clone())
            .map_err(|e| ContainerError::invalid_argument(&self.service, index, e.to_string()))
    }
}

/// A constructible type: its constructor and the initializers callable by name
pub struct TargetType {
    type_name: &'static str,
    constructor: Constructor,
    methods: HashMap<String, Initializer>,
}

impl TargetType {
    /// Rust type name of the instances this target produces
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Run the constructor
    pub fn construct(&self, arguments: &Arguments) -> Result<ServiceInstance, ContainerError> {
        (self.constructor)(arguments)
    }

    /// Look up an initializer by method name
    pub fn method(&self, name: &str) -> Option<&Initializer> {
        self.methods.get(name)
    }

    /// Check whether a method of this name can be called
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered method names
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetType")
            .field("type_name", &self.type_name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Registry of constructible types keyed by target identifier
#[derive(Debug, Default)]
pub struct TypeRegistry {
    targets: HashMap<String, TargetType>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target and its constructor. Registering an identifier twice
    /// replaces the earlier entry, methods included.
    pub fn register<T, F>(
        &mut self,
        target: impl Into<String>,
        constructor: F,
    ) -> TypeRegistration<'_, T>
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        let target = target.into();
        let entry = TargetType {
            type_name: std::any::type_name::<T>(),
            constructor: Box::new(move |arguments: &Arguments| {
                let instance: ServiceInstance = Box::new(constructor(arguments)?);
                Ok(instance)
            }),
            methods: HashMap::new(),
        };

        self.targets.insert(target.clone(), entry);
        TypeRegistration {
            registry: self,
            target,
            _phantom: PhantomData,
        }
    }

    /// Look up a target
    pub fn get(&self, target: &str) -> Option<&TargetType> {
        self.targets.get(target)
    }

    /// Check if a target is registered
    pub fn contains(&self, target: &str) -> bool {
        self.targets.contains_key(target)
    }

    /// Number of registered targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Handle returned by [`TypeRegistry::register`] to attach initializer methods
pub struct TypeRegistration<'a, T> {
    registry: &'a mut TypeRegistry,
    target: String,
    _phantom: PhantomData<fn() -> T>,
}

impl<'a, T: Any + Send + Sync> TypeRegistration<'a, T> {
    /// Register a method that call definitions may invoke by name
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut T, &Arguments) -> Result<(), ContainerError> + Send + Sync + 'static,
    {
        let initializer: Initializer = Box::new(
            move |instance: &mut (dyn Any + Send + Sync), arguments: &Arguments| {
                let instance = instance.downcast_mut::<T>().ok_or_else(|| {
                    ContainerError::construction(
                        arguments.service_name(),
                        format!("instance is not a {}", std::any::type_name::<T>()),
                    )
                })?;
                method(instance, arguments)
            },
        );

        if let Some(entry) = self.registry.targets.get_mut(&self.target) {
            entry.methods.insert(name.into(), initializer);
        }
        self
    }
}
