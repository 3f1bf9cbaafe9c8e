//! Dependency injection based on explicit metadata, rather than runtime reflection.
//!
//! Components declare their dependencies, which are resolved recursively by a
//! [ComponentFactory](factory::ComponentFactory). Each component is constructed at most once and
//! shared between all its dependents, while dependency cycles are detected and reported instead of
//! recursing indefinitely. Declarative facts about types and their methods are kept in an explicit
//! [MetadataStore](metadata::MetadataStore).
//!
//! ### Features
//!
//! * `threadsafe` - use threadsafe pointers and `Send + Sync` trait bounds
//! * `derive` - automatically import helper proc macros

pub mod component;
pub mod component_registry;
pub mod error;
pub mod factory;
pub mod instance_provider;
pub mod metadata;
pub mod scope;

#[cfg(feature = "derive")]
pub use trellis_di_derive::Component;
