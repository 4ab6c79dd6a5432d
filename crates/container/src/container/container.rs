use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;

use crate::config::ContainerConfig;
use crate::container::builder::ContainerBuilder;
use crate::container::resolver::ResolutionPath;
use crate::container::service_builder::ServiceBuilder;
use crate::container::validation::{DefinitionValidator, ValidationError};
use crate::definition::ServiceDefinition;
use crate::errors::ContainerError;
use crate::parameters::Parameters;
use crate::registry::{SharedService, TypeRegistry};

/// Definition-driven dependency injection container.
///
/// Services are built on first `get` and cached for the lifetime of the
/// container; at most one instance is ever constructed per service name.
/// Construction is serialized across threads, cache hits only take a read lock.
pub struct Container {
    definitions: HashMap<String, ServiceDefinition>,
    parameters: Parameters,
    types: TypeRegistry,
    config: ContainerConfig,
    instances: RwLock<HashMap<String, SharedService>>,
    construction: Mutex<()>,
}

impl Container {
    /// Create a container with the default configuration
    pub fn new(
        definitions: HashMap<String, ServiceDefinition>,
        parameters: Parameters,
        types: TypeRegistry,
    ) -> Self {
        Self::with_config(definitions, parameters, types, ContainerConfig::default())
    }

    /// Create a container with an explicit configuration
    pub fn with_config(
        definitions: HashMap<String, ServiceDefinition>,
        parameters: Parameters,
        types: TypeRegistry,
        config: ContainerConfig,
    ) -> Self {
        Self {
            definitions,
            parameters,
            types,
            config,
            instances: RwLock::new(HashMap::new()),
            construction: Mutex::new(()),
        }
    }

    /// Start building a container
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Check if a service is defined
    pub fn has(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Retrieve a service, constructing it on first access
    pub fn get(&self, name: &str) -> Result<SharedService, ContainerError> {
        if !self.has(name) {
            return Err(ContainerError::service_not_found(name));
        }

        if let Some(service) = self.cached(name)? {
            tracing::trace!("Service '{}' served from cache", name);
            return Ok(service);
        }

        // Guards `()`: a panicking factory leaves no state to repair
        let _guard = self
            .construction
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut path = ResolutionPath::new();
        self.resolve_service(name, &mut path)
    }

    /// Retrieve a service as its concrete type
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        self.get(name)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                service: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Retrieve a parameter by dotted path
    pub fn get_parameter(&self, path: &str) -> Result<&Value, ContainerError> {
        self.parameters.resolve(path)
    }

    /// Check if a parameter path resolves
    pub fn has_parameter(&self, path: &str) -> bool {
        self.parameters.exists(path)
    }

    /// Validate every definition without constructing anything
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        DefinitionValidator::new(&self.definitions, &self.types, &self.parameters).validate()
    }

    /// Look up a service definition
    pub fn definition(&self, name: &str) -> Option<&ServiceDefinition> {
        self.definitions.get(name)
    }

    /// Names of all defined services, sorted
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of defined services
    pub fn service_count(&self) -> usize {
        self.definitions.len()
    }

    /// Check if a service has already been constructed
    pub fn is_instantiated(&self, name: &str) -> bool {
        matches!(self.cached(name), Ok(Some(_)))
    }

    /// Get the number of constructed services
    pub fn instantiated_count(&self) -> usize {
        self.instances.read().map(|instances| instances.len()).unwrap_or(0)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Resolve a service while another construction may be in progress.
    ///
    /// Callers must hold the construction lock; `path` lists the services
    /// being built on this thread.
    pub(crate) fn resolve_service(
        &self,
        name: &str,
        path: &mut ResolutionPath,
    ) -> Result<SharedService, ContainerError> {
        let definition = self
            .definitions
            .get(name)
            .ok_or_else(|| ContainerError::service_not_found(name))?;

        if let Some(service) = self.cached(name)? {
            return Ok(service);
        }

        if path.contains(name) {
            return Err(ContainerError::CircularReference {
                service: name.to_string(),
                path: path.path_with(name),
            });
        }

        if path.len() >= self.config.max_resolution_depth {
            return Err(ContainerError::ResolutionDepthExceeded {
                service: name.to_string(),
                max_depth: self.config.max_resolution_depth,
                path: path.path_with(name),
            });
        }

        path.push(name);
        let result = ServiceBuilder::new(self).build(name, definition, path);
        path.pop();

        let service = result.map_err(|error| {
            tracing::warn!("Failed to construct service '{}': {}", name, error);
            error
        })?;

        self.instances
            .write()
            .map_err(|_| ContainerError::lock("service_instances"))?
            .insert(name.to_string(), service.clone());

        tracing::debug!("Service '{}' constructed and cached", name);
        Ok(service)
    }

    fn cached(&self, name: &str) -> Result<Option<SharedService>, ContainerError> {
        let instances = self
            .instances
            .read()
            .map_err(|_| ContainerError::lock("service_instances"))?;
        Ok(instances.get(name).cloned())
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.service_count())
            .field("instantiated_count", &self.instantiated_count())
            .field("parameter_count", &self.parameters.len())
            .field("target_count", &self.types.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::CallDefinition;
    use crate::reference::Argument;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Node {
        label: String,
        children: Vec<Arc<Node>>,
        tags: Vec<String>,
    }

    fn node_types(built: Arc<AtomicUsize>) -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types
            .register("Node", move |args| {
                built.fetch_add(1, Ordering::SeqCst);
                let mut children = Vec::new();
                for index in 1..args.len() {
                    children.push(args.service::<Node>(index)?);
                }
                Ok(Node {
                    label: args.string(0)?,
                    children,
                    tags: Vec::new(),
                })
            })
            .method("tag", |node: &mut Node, args| {
                node.tags.push(args.string(0)?);
                Ok(())
            })
            .method("fail", |_node: &mut Node, args| {
                Err(ContainerError::construction(args.service_name(), "refused"))
            });
        types
    }

    fn node(label: &str, children: &[&str]) -> ServiceDefinition {
        children.iter().fold(ServiceDefinition::new("Node").argument(label), |def, child| {
            def.argument(Argument::service(*child))
        })
    }

    fn container(definitions: Vec<(&str, ServiceDefinition)>) -> (Container, Arc<AtomicUsize>) {
        let built = Arc::new(AtomicUsize::new(0));
        let definitions = definitions
            .into_iter()
            .map(|(name, def)| (name.to_string(), def))
            .collect();
        let parameters = Parameters::from_value(json!({"app": {"name": "demo"}})).unwrap();
        (
            Container::new(definitions, parameters, node_types(built.clone())),
            built,
        )
    }

    #[test]
    fn test_get_caches_instance() {
        let (container, built) = container(vec![("root", node("root", &[]))]);

        assert!(!container.is_instantiated("root"));
        let first = container.get_as::<Node>("root").unwrap();
        let second = container.get_as::<Node>("root").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert!(container.is_instantiated("root"));
        assert_eq!(container.instantiated_count(), 1);
    }

    #[test]
    fn test_unknown_service_constructs_nothing() {
        let (container, built) = container(vec![("root", node("root", &[]))]);

        assert!(!container.has("missing"));
        let err = container.get("missing").unwrap_err();
        assert!(err.is_service_not_found());
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shared_dependency_is_built_once() {
        let (container, built) = container(vec![
            ("left", node("left", &["shared"])),
            ("right", node("right", &["shared"])),
            ("shared", node("shared", &[])),
        ]);

        let left = container.get_as::<Node>("left").unwrap();
        let right = container.get_as::<Node>("right").unwrap();

        assert!(Arc::ptr_eq(&left.children[0], &right.children[0]));
        assert_eq!(left.children[0].label, "shared");
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_transitive_cycle_is_detected() {
        let (container, built) = container(vec![
            ("a", node("a", &["b"])),
            ("b", node("b", &["c"])),
            ("c", node("c", &["a"])),
        ]);

        for _ in 0..2 {
            match container.get("a").unwrap_err() {
                ContainerError::CircularReference { service, path } => {
                    assert_eq!(service, "a");
                    assert_eq!(path, "a -> b -> c -> a");
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert_eq!(container.instantiated_count(), 0);
    }

    #[test]
    fn test_resolution_depth_is_bounded() {
        let built = Arc::new(AtomicUsize::new(0));
        let definitions: HashMap<String, ServiceDefinition> = vec![
            ("a".to_string(), node("a", &["b"])),
            ("b".to_string(), node("b", &["c"])),
            ("c".to_string(), node("c", &[])),
        ]
        .into_iter()
        .collect();
        let container = Container::with_config(
            definitions,
            Parameters::new(),
            node_types(built),
            ContainerConfig::new().with_max_resolution_depth(2),
        );

        let err = container.get("a").unwrap_err();
        assert!(matches!(err, ContainerError::ResolutionDepthExceeded { max_depth: 2, .. }));
        assert!(container.get("b").is_ok());
    }

    #[test]
    fn test_calls_run_in_order_once() {
        let definition = node("root", &[])
            .call(CallDefinition::new("tag").argument("first"))
            .call(CallDefinition::new("tag").argument(Argument::parameter("app.name")));
        let (container, _) = container(vec![("root", definition)]);

        let root = container.get_as::<Node>("root").unwrap();
        assert_eq!(root.tags, vec!["first".to_string(), "demo".to_string()]);

        let again = container.get_as::<Node>("root").unwrap();
        assert_eq!(again.tags.len(), 2);
    }

    #[test]
    fn test_failed_construction_is_not_cached() {
        let definition = node("root", &["child"]).call(CallDefinition::new("fail"));
        let (container, built) =
            container(vec![("root", definition), ("child", node("child", &[]))]);

        let err = container.get("root").unwrap_err();
        assert!(err.to_string().contains("refused"));
        assert!(!container.is_instantiated("root"));
        assert!(container.is_instantiated("child"));

        assert!(container.get("root").is_err());
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_panicking_factory_does_not_block_later_builds() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let mut types = TypeRegistry::new();
        types.register("Flaky", move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first build blows up");
            }
            Ok(String::from("flaky"))
        });
        types.register("Steady", |_| Ok(String::from("steady")));

        let container = Container::builder()
            .service("flaky", ServiceDefinition::new("Flaky"))
            .service("steady", ServiceDefinition::new("Steady"))
            .types(types)
            .build()
            .unwrap();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = container.get("flaky");
        }));
        assert!(outcome.is_err());
        assert!(!container.is_instantiated("flaky"));

        assert_eq!(*container.get_as::<String>("flaky").unwrap(), "flaky");
        assert_eq!(*container.get_as::<String>("steady").unwrap(), "steady");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_get_as_reports_type_mismatch() {
        let (container, _) = container(vec![("root", node("root", &[]))]);
        let err = container.get_as::<String>("root").unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn test_parameters_through_container() {
        let (container, _) = container(vec![]);
        assert_eq!(container.get_parameter("app.name").unwrap(), &json!("demo"));
        assert!(container.has_parameter("app"));
        assert!(!container.has_parameter("app.version"));
        assert!(container.get_parameter("app.version").unwrap_err().is_parameter_not_found());
    }

    #[test]
    fn test_introspection() {
        let (container, _) = container(vec![("b", node("b", &[])), ("a", node("a", &[]))]);
        assert_eq!(container.service_names(), vec!["a", "b"]);
        assert_eq!(container.service_count(), 2);
        assert!(container.definition("a").is_some());
        assert!(format!("{:?}", container).contains("service_count: 2"));
    }
}
