use std::env;

use thiserror::Error;

/// Environment variable overriding [`ContainerConfig::max_resolution_depth`]
pub const MAX_DEPTH_ENV: &str = "ELIF_CONTAINER_MAX_DEPTH";

/// Environment variable overriding [`ContainerConfig::validate_on_build`]
pub const VALIDATE_ENV: &str = "ELIF_CONTAINER_VALIDATE";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Runtime behaviour of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Deepest chain of nested service constructions allowed for one `get`
    pub max_resolution_depth: usize,
    /// Run whole-table validation when the container is built
    pub validate_on_build: bool,
}

impl ContainerConfig {
    pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 64;

    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            max_resolution_depth: Self::DEFAULT_MAX_RESOLUTION_DEPTH,
            validate_on_build: false,
        }
    }

    /// Configuration for tests: strict validation up front
    pub fn testing() -> Self {
        Self {
            validate_on_build: true,
            ..Self::new()
        }
    }

    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    pub fn with_validate_on_build(mut self, validate: bool) -> Self {
        self.validate_on_build = validate;
        self
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(depth) = env::var(MAX_DEPTH_ENV) {
            config.max_resolution_depth = depth.trim().parse().map_err(|_| {
                ConfigError::invalid_value("max_resolution_depth", &depth, "a positive integer")
            })?;
        }

        if let Ok(validate) = env::var(VALIDATE_ENV) {
            config.validate_on_build = parse_bool(&validate).ok_or_else(|| {
                ConfigError::invalid_value(
                    "validate_on_build",
                    &validate,
                    "true, false, 1, 0, yes or no",
                )
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::invalid_value(
                "max_resolution_depth",
                "0",
                "a positive integer",
            ));
        }

        Ok(())
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
