use thiserror::Error;

use crate::config::ConfigError;

/// Error type for every fallible container operation
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Service not found: {name}")]
    ServiceNotFound { name: String },

    #[error("Parameter not found: {path}")]
    ParameterNotFound { path: String },

    #[error("{service} service entry must contain a 'target' key")]
    MissingTarget { service: String },

    #[error("{service} service class does not exist: {target}")]
    UnknownTarget { service: String, target: String },

    #[error("{service} service contains a circular reference: {path}")]
    CircularReference { service: String, path: String },

    #[error("{service} service calls must contain a 'method' key")]
    MissingMethod { service: String },

    #[error("{service} service asks for call to uncallable method: {method}")]
    UncallableMethod { service: String, method: String },

    #[error("{service} service exceeds the maximum resolution depth of {max_depth}: {path}")]
    ResolutionDepthExceeded {
        service: String,
        max_depth: usize,
        path: String,
    },

    #[error("{service} service received an invalid argument at position {index}: {message}")]
    InvalidArgument {
        service: String,
        index: usize,
        message: String,
    },

    #[error("{service} service is not of the requested type {expected}")]
    TypeMismatch {
        service: String,
        expected: &'static str,
    },

    #[error("{service} service construction failed: {message}")]
    Construction { service: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid parameter table: {message}")]
    InvalidParameters { message: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },
}

impl ContainerError {
    /// Create a new service not found error
    pub fn service_not_found(name: impl Into<String>) -> Self {
        Self::ServiceNotFound { name: name.into() }
    }

    /// Create a new parameter not found error
    pub fn parameter_not_found(path: impl Into<String>) -> Self {
        Self::ParameterNotFound { path: path.into() }
    }

    /// Create a construction error, typically from inside a factory
    pub fn construction(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(
        service: impl Into<String>,
        index: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            service: service.into(),
            index,
            message: message.into(),
        }
    }

    /// Create a lock error for the named resource
    pub(crate) fn lock(resource: &str) -> Self {
        Self::LockError {
            resource: resource.to_string(),
        }
    }

    /// Check if the error is a service not found error
    pub fn is_service_not_found(&self) -> bool {
        matches!(self, Self::ServiceNotFound { .. })
    }

    /// Check if the error is a parameter not found error
    pub fn is_parameter_not_found(&self) -> bool {
        matches!(self, Self::ParameterNotFound { .. })
    }

    /// Check if the error is a circular reference error
    pub fn is_circular_reference(&self) -> bool {
        matches!(self, Self::CircularReference { .. })
    }

    /// Check if the error is a violation of the construction contract:
    /// a malformed definition, an unknown target, a cycle, or a failing factory.
    pub fn is_container_exception(&self) -> bool {
        matches!(
            self,
            Self::MissingTarget { .. }
                | Self::UnknownTarget { .. }
                | Self::CircularReference { .. }
                | Self::MissingMethod { .. }
                | Self::UncallableMethod { .. }
                | Self::ResolutionDepthExceeded { .. }
                | Self::InvalidArgument { .. }
                | Self::TypeMismatch { .. }
                | Self::Construction { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_defect() {
        let err = ContainerError::MissingTarget {
            service: "foo".to_string(),
        };
        assert_eq!(err.to_string(), "foo service entry must contain a 'target' key");

        let err = ContainerError::UnknownTarget {
            service: "foo".to_string(),
            target: "LALALA".to_string(),
        };
        assert!(err.to_string().contains("class does not exist: LALALA"));

        let err = ContainerError::UncallableMethod {
            service: "foo".to_string(),
            method: "nope".to_string(),
        };
        assert!(err.to_string().contains("call to uncallable method"));
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let not_found = ContainerError::service_not_found("foo");
        assert!(not_found.is_service_not_found());
        assert!(!not_found.is_container_exception());

        let missing = ContainerError::parameter_not_found("a.b");
        assert!(missing.is_parameter_not_found());
        assert!(!missing.is_container_exception());

        let cycle = ContainerError::CircularReference {
            service: "foo".to_string(),
            path: "foo -> foo".to_string(),
        };
        assert!(cycle.is_circular_reference());
        assert!(cycle.is_container_exception());

        assert!(ContainerError::construction("foo", "boom").is_container_exception());
        assert!(!ContainerError::lock("cache").is_container_exception());
    }
}
