//! Definition-driven service container for elif.rs.
//!
//! A [`Container`] is handed a table of [`ServiceDefinition`]s, a nested
//! [`Parameters`] table and a [`TypeRegistry`] of constructible targets. Services
//! are built lazily on first [`Container::get`], with [`ServiceReference`]s and
//! [`ParameterReference`]s in their argument lists resolved at that point, and
//! cached for the lifetime of the container.
//!
//! ```
//! use elif_container::{Argument, CallDefinition, Container, ServiceDefinition};
//! use serde_json::json;
//!
//! struct Mailer {
//!     host: String,
//!     sender: Option<String>,
//! }
//!
//! let container = Container::builder()
//!     .service(
//!         "mailer",
//!         ServiceDefinition::new("Mailer")
//!             .argument(Argument::parameter("mail.host"))
//!             .call(CallDefinition::new("setSender").argument("noreply@example.com")),
//!     )
//!     .parameter_values(json!({"mail": {"host": "smtp.example.com"}}))?
//!     .configure_types(|types| {
//!         types
//!             .register("Mailer", |args| Ok(Mailer { host: args.string(0)?, sender: None }))
//!             .method("setSender", |mailer: &mut Mailer, args| {
//!                 mailer.sender = Some(args.string(0)?);
//!                 Ok(())
//!             });
//!     })
//!     .build()?;
//!
//! let mailer = container.get_as::<Mailer>("mailer")?;
//! assert_eq!(mailer.host, "smtp.example.com");
//! assert_eq!(mailer.sender.as_deref(), Some("noreply@example.com"));
//! # Ok::<(), elif_container::ContainerError>(())
//! ```

pub mod config;
pub mod container;
pub mod definition;
pub mod errors;
pub mod parameters;
pub mod reference;
pub mod registry;

pub use config::{ConfigError, ContainerConfig};
pub use container::{Container, ContainerBuilder, ResolutionPath, ValidationError};
pub use definition::{CallDefinition, ServiceDefinition};
pub use errors::ContainerError;
pub use parameters::Parameters;
pub use reference::{Argument, ParameterReference, ServiceReference};
pub use registry::{Arguments, ResolvedArgument, SharedService, TypeRegistry};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get crate version
pub fn version() -> &'static str {
    VERSION
}
