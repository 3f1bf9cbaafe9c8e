//! Functionality related to registering definitions of components. [ComponentInstanceProvider]s
//! should create [Component] instances based on those definitions, which can be registered
//! automatically or manually.
//!
//! [ComponentInstanceProvider]: crate::instance_provider::ComponentInstanceProvider

use crate::component::Component;
use crate::component_registry::internal::ComponentDefinitionRegisterer;
use crate::error::{ComponentDefinitionRegistryError, ComponentInstanceProviderError};
use crate::instance_provider::{
    ComponentInstanceAnyPtr, ComponentInstancePtr, ResolvedDependencies,
};
use crate::metadata::ClassId;
use derivative::Derivative;
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;
use tracing::debug;

/// Constructor for type-erased instances. Receives resolved dependencies in declaration order.
pub type ComponentConstructor = fn(
    dependencies: &mut ResolvedDependencies,
) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError>;

/// Definition for a [Component] registered in a definition registry.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ComponentDefinition {
    /// Class which this definition constructs.
    pub class: ClassId,

    /// Declared dependencies - resolved in this order and passed to the constructor positionally.
    pub dependencies: Vec<ClassId>,

    #[derivative(Debug = "ignore")]
    pub constructor: ComponentConstructor,
}

impl ComponentDefinition {
    /// Creates a definition based on the [Component] implementation of given type.
    pub fn of<T: Component>() -> Self {
        Self {
            class: ClassId::of::<T>(),
            dependencies: T::dependencies(),
            constructor: construct::<T>,
        }
    }
}

fn construct<T: Component>(
    dependencies: &mut ResolvedDependencies,
) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
    T::create(dependencies).map(|instance| ComponentInstancePtr::new(instance) as ComponentInstanceAnyPtr)
}

/// A registry of component definitions which can be used when requesting instances via a
/// [ComponentInstanceProvider](crate::instance_provider::ComponentInstanceProvider).
#[cfg_attr(test, automock)]
pub trait ComponentDefinitionRegistry {
    /// Adds a new definition for a given class. Note: handling of duplicate definitions is
    /// registry-dependent.
    fn register_component(
        &mut self,
        definition: ComponentDefinition,
    ) -> Result<(), ComponentDefinitionRegistryError>;

    /// Returns the definition registered for given class.
    fn component(&self, class: ClassId) -> Option<ComponentDefinition>;

    /// Checks if given class is present in this registry.
    fn is_registered(&self, class: ClassId) -> bool;

    /// Returns a copy of the whole registry as a map.
    fn all_definitions(&self) -> FxHashMap<ClassId, ComponentDefinition>;
}

/// Helper trait for [ComponentDefinitionRegistry] providing strongly-typed access.
pub trait TypedComponentDefinitionRegistry {
    /// Typesafe version of [ComponentDefinitionRegistry::register_component].
    fn register_component_typed<T: Component>(
        &mut self,
    ) -> Result<(), ComponentDefinitionRegistryError>;
}

impl<R: ComponentDefinitionRegistry + ?Sized> TypedComponentDefinitionRegistry for R {
    #[inline]
    fn register_component_typed<T: Component>(
        &mut self,
    ) -> Result<(), ComponentDefinitionRegistryError> {
        self.register_component(ComponentDefinition::of::<T>())
    }
}

/// Registry of component definitions, optionally initialized from statically registered
/// definitions.
#[derive(Clone, Debug, Default)]
pub struct DefaultComponentDefinitionRegistry {
    definitions: FxHashMap<ClassId, ComponentDefinition>,
    allow_definition_overriding: bool,
}

impl DefaultComponentDefinitionRegistry {
    /// Creates an empty registry.
    pub fn new(allow_definition_overriding: bool) -> Self {
        Self {
            definitions: Default::default(),
            allow_definition_overriding,
        }
    }

    /// Creates a registry containing all definitions submitted by derived components.
    pub fn from_static(
        allow_definition_overriding: bool,
    ) -> Result<Self, ComponentDefinitionRegistryError> {
        let mut registry = Self::new(allow_definition_overriding);
        for registerer in inventory::iter::<ComponentDefinitionRegisterer> {
            registry.register_component((registerer.register)())?;
        }

        debug!(
            components = registry.definitions.len(),
            "Registered static component definitions."
        );

        Ok(registry)
    }

    /// Creates a copy of this registry containing only given classes. Classes without definitions
    /// are skipped.
    pub fn scoped<I: IntoIterator<Item = ClassId>>(&self, classes: I) -> Self {
        Self {
            definitions: classes
                .into_iter()
                .filter_map(|class| {
                    self.definitions
                        .get(&class)
                        .map(|definition| (class, definition.clone()))
                })
                .collect(),
            allow_definition_overriding: self.allow_definition_overriding,
        }
    }
}

impl ComponentDefinitionRegistry for DefaultComponentDefinitionRegistry {
    fn register_component(
        &mut self,
        definition: ComponentDefinition,
    ) -> Result<(), ComponentDefinitionRegistryError> {
        if !self.allow_definition_overriding && self.definitions.contains_key(&definition.class) {
            return Err(ComponentDefinitionRegistryError::DuplicateComponentType(
                definition.class.type_name().to_string(),
            ));
        }

        self.definitions.insert(definition.class, definition);
        Ok(())
    }

    #[inline]
    fn component(&self, class: ClassId) -> Option<ComponentDefinition> {
        self.definitions.get(&class).cloned()
    }

    #[inline]
    fn is_registered(&self, class: ClassId) -> bool {
        self.definitions.contains_key(&class)
    }

    #[inline]
    fn all_definitions(&self) -> FxHashMap<ClassId, ComponentDefinition> {
        self.definitions.clone()
    }
}

#[doc(hidden)]
pub mod internal {
    use crate::component_registry::ComponentDefinition;
    use inventory::collect;
    pub use inventory::submit;

    pub struct ComponentDefinitionRegisterer {
        pub register: fn() -> ComponentDefinition,
    }

    collect!(ComponentDefinitionRegisterer);
}
