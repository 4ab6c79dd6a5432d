pub mod builder;
#[allow(clippy::module_inception)]
pub mod container;
pub mod resolver;
pub mod validation;

mod service_builder;


pub use builder::ContainerBuilder;
pub use container::Container;
pub use resolver::ResolutionPath;
pub use validation::{DefinitionValidator, ValidationError};
