use crate::metadata::ClassId;
use itertools::Itertools;
use thiserror::Error;

/// Errors related to creating and managing components.
#[derive(Error, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ComponentInstanceProviderError {
    #[error("Cannot resolve component '{0}' - no constructor is registered for it.")]
    UnresolvableProvider(ClassId),
    #[error("Detected a dependency cycle: {}", .0.iter().join(" -> "))]
    DependencyCycle(Vec<ClassId>),
    #[error("Tried to downcast component to incompatible type: {0}")]
    IncompatibleComponent(ClassId),
    #[error("Component '{owner}' requested more dependencies than the {declared} it declares.")]
    MissingDependencyArgument { owner: ClassId, declared: usize },
}

/// Error related to component registries.
#[derive(Error, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ComponentDefinitionRegistryError {
    #[error("Attempted to re-register a concrete component type: {0}")]
    DuplicateComponentType(String),
}

/// Errors related to attaching metadata.
#[derive(Error, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MetadataError {
    #[error("Route metadata can only be attached to methods, but '{member}' is not a method of '{class}'.")]
    DecoratorTarget {
        class: ClassId,
        member: &'static str,
    },
    #[error("Class '{0}' already declares its members - only one controller block is allowed per type.")]
    DuplicatePrototype(ClassId),
}
