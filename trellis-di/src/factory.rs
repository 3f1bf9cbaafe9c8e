//! Core functionality for creating [Component](crate::component::Component) instances.

use crate::component_registry::{
    ComponentDefinition, ComponentDefinitionRegistry, DefaultComponentDefinitionRegistry,
};
use crate::error::ComponentDefinitionRegistryError;
use crate::instance_provider::{
    ComponentInstanceAnyPtr, ComponentInstanceProvider, ComponentInstanceProviderError,
    ResolvedDependencies,
};
use crate::metadata::ClassId;
use crate::scope::{ScopePtr, SingletonScope};
use itertools::Itertools;
use tracing::debug;

#[cfg(not(feature = "threadsafe"))]
pub type ComponentDefinitionRegistryPtr = Box<dyn ComponentDefinitionRegistry>;
#[cfg(feature = "threadsafe")]
pub type ComponentDefinitionRegistryPtr = Box<dyn ComponentDefinitionRegistry + Send + Sync>;

/// Builder for [ComponentFactory] with sensible defaults, for easy construction.
pub struct ComponentFactoryBuilder {
    definition_registry: ComponentDefinitionRegistryPtr,
    scope: ScopePtr,
}

impl ComponentFactoryBuilder {
    /// Creates a new builder with a default configuration, using all statically registered
    /// components.
    pub fn new() -> Result<Self, ComponentDefinitionRegistryError> {
        Ok(Self {
            definition_registry: Box::new(DefaultComponentDefinitionRegistry::from_static(true)?),
            scope: Box::<SingletonScope>::default(),
        })
    }

    /// Sets new [ComponentDefinitionRegistry].
    pub fn with_definition_registry(
        mut self,
        definition_registry: ComponentDefinitionRegistryPtr,
    ) -> Self {
        self.definition_registry = definition_registry;
        self
    }

    /// Sets new scope for created instances.
    pub fn with_scope(mut self, scope: ScopePtr) -> Self {
        self.scope = scope;
        self
    }

    /// Builds resulting [ComponentFactory].
    pub fn build(self) -> ComponentFactory {
        ComponentFactory::new(self.definition_registry, self.scope)
    }
}

/// Generic factory for [Component](crate::component::Component) instances. Uses definitions from
/// the [ComponentDefinitionRegistry] to create instances and stores them in a
/// [scope](crate::scope) for reuse, so each class is constructed at most once.
pub struct ComponentFactory {
    definition_registry: ComponentDefinitionRegistryPtr,
    scope: ScopePtr,
    types_under_construction: Vec<ClassId>,
}

impl ComponentFactory {
    /// Creates a new factory with given registry and instance scope.
    pub fn new(definition_registry: ComponentDefinitionRegistryPtr, scope: ScopePtr) -> Self {
        Self {
            definition_registry,
            scope,
            types_under_construction: Default::default(),
        }
    }

    fn create_instance(
        &mut self,
        definition: &ComponentDefinition,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        let dependencies: Vec<_> = definition
            .dependencies
            .iter()
            .map(|dependency| self.resolve(*dependency))
            .try_collect()?;

        debug!(component = %definition.class, "Constructing component.");

        (definition.constructor)(&mut ResolvedDependencies::new(
            definition.class,
            dependencies,
        ))
    }
}

impl ComponentInstanceProvider for ComponentFactory {
    fn resolve(
        &mut self,
        class: ClassId,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        if let Some(instance) = self.scope.instance(class) {
            return Ok(instance);
        }

        if let Some(position) = self
            .types_under_construction
            .iter()
            .position(|under_construction| *under_construction == class)
        {
            let mut cycle = self.types_under_construction[position..].to_vec();
            cycle.push(class);

            return Err(ComponentInstanceProviderError::DependencyCycle(cycle));
        }

        let definition = self
            .definition_registry
            .component(class)
            .ok_or(ComponentInstanceProviderError::UnresolvableProvider(class))?;

        self.types_under_construction.push(class);
        let instance = self.create_instance(&definition);
        self.types_under_construction.pop();

        let instance = instance?;
        self.scope.store_instance(class, instance.clone());

        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use crate::component_registry::{ComponentDefinition, MockComponentDefinitionRegistry};
    use crate::factory::{ComponentDefinitionRegistryPtr, ComponentFactory};
    use crate::instance_provider::{
        ComponentInstanceAnyPtr, ComponentInstanceProvider, ComponentInstanceProviderError,
        ComponentInstancePtr, ResolvedDependencies,
    };
    use crate::metadata::ClassId;
    use crate::scope::{MockScope, ScopePtr, SingletonScope};
    use mockall::predicate::*;

    struct A;
    struct B;
    struct C;

    fn constructor(
        _dependencies: &mut ResolvedDependencies,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        Ok(ComponentInstancePtr::new(0) as ComponentInstanceAnyPtr)
    }

    fn error_constructor(
        _dependencies: &mut ResolvedDependencies,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        Err(ComponentInstanceProviderError::IncompatibleComponent(
            ClassId::of::<i8>(),
        ))
    }

    fn consuming_constructor(
        dependencies: &mut ResolvedDependencies,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        let mut instances = vec![];
        while dependencies.remaining() > 0 {
            instances.push(dependencies.next_instance()?);
        }

        Ok(ComponentInstancePtr::new(instances) as ComponentInstanceAnyPtr)
    }

    fn definition<T: 'static>(dependencies: Vec<ClassId>) -> ComponentDefinition {
        ComponentDefinition {
            class: ClassId::of::<T>(),
            dependencies,
            constructor,
        }
    }

    fn create_factory(registry: MockComponentDefinitionRegistry) -> ComponentFactory {
        ComponentFactory::new(
            Box::new(registry) as ComponentDefinitionRegistryPtr,
            Box::<SingletonScope>::default(),
        )
    }

    #[test]
    fn should_resolve_instance() {
        let id = ClassId::of::<A>();

        let mut registry = MockComponentDefinitionRegistry::new();
        registry
            .expect_component()
            .with(eq(id))
            .times(1)
            .return_const(Some(definition::<A>(vec![])));

        let mut factory = create_factory(registry);
        assert!(factory.resolve(id).is_ok());
    }

    #[test]
    fn should_return_same_instance() {
        let id = ClassId::of::<A>();

        let mut registry = MockComponentDefinitionRegistry::new();
        registry
            .expect_component()
            .with(eq(id))
            .times(1)
            .return_const(Some(definition::<A>(vec![])));

        let mut factory = create_factory(registry);
        let first = factory.resolve(id).unwrap();
        let second = factory.resolve(id).unwrap();

        assert!(ComponentInstancePtr::ptr_eq(&first, &second));
    }

    #[test]
    fn should_not_resolve_missing_definition() {
        let id = ClassId::of::<A>();

        let mut registry = MockComponentDefinitionRegistry::new();
        registry
            .expect_component()
            .with(eq(id))
            .times(1)
            .return_const(None);

        let mut factory = create_factory(registry);
        assert_eq!(
            factory.resolve(id).unwrap_err(),
            ComponentInstanceProviderError::UnresolvableProvider(id)
        );
    }

    #[test]
    fn should_detect_self_dependency() {
        let id = ClassId::of::<A>();

        let mut registry = MockComponentDefinitionRegistry::new();
        registry
            .expect_component()
            .with(eq(id))
            .times(1)
            .return_const(Some(definition::<A>(vec![id])));

        let mut factory = create_factory(registry);
        assert_eq!(
            factory.resolve(id).unwrap_err(),
            ComponentInstanceProviderError::DependencyCycle(vec![id, id])
        );
    }

    #[test]
    fn should_detect_dependency_cycle_path() {
        let a = ClassId::of::<A>();
        let b = ClassId::of::<B>();
        let c = ClassId::of::<C>();

        let mut registry = MockComponentDefinitionRegistry::new();
        registry
            .expect_component()
            .with(eq(a))
            .return_const(Some(definition::<A>(vec![b])));
        registry
            .expect_component()
            .with(eq(b))
            .return_const(Some(definition::<B>(vec![c])));
        registry
            .expect_component()
            .with(eq(c))
            .return_const(Some(definition::<C>(vec![b])));

        let mut factory = create_factory(registry);
        let error = factory.resolve(a).unwrap_err();

        assert_eq!(
            error,
            ComponentInstanceProviderError::DependencyCycle(vec![b, c, b])
        );
        assert_eq!(error.to_string(), "Detected a dependency cycle: B -> C -> B");

        // construction state is unwound after a failure
        assert!(matches!(
            factory.resolve(c).unwrap_err(),
            ComponentInstanceProviderError::DependencyCycle(cycle) if cycle == vec![c, b, c]
        ));
    }

    #[test]
    fn should_construct_shared_dependency_once() {
        let a = ClassId::of::<A>();
        let b = ClassId::of::<B>();
        let c = ClassId::of::<C>();

        let mut registry = MockComponentDefinitionRegistry::new();
        registry
            .expect_component()
            .with(eq(a))
            .times(1)
            .return_const(Some(definition::<A>(vec![b, c])));
        registry
            .expect_component()
            .with(eq(b))
            .times(1)
            .return_const(Some(definition::<B>(vec![c])));
        registry
            .expect_component()
            .with(eq(c))
            .times(1)
            .return_const(Some(definition::<C>(vec![])));

        let mut factory = create_factory(registry);
        assert!(factory.resolve(a).is_ok());
    }

    #[test]
    fn should_pass_dependencies_in_declared_order() {
        let a = ClassId::of::<A>();
        let b = ClassId::of::<B>();
        let c = ClassId::of::<C>();

        let mut registry = MockComponentDefinitionRegistry::new();
        registry
            .expect_component()
            .with(eq(a))
            .return_const(Some(ComponentDefinition {
                class: a,
                dependencies: vec![c, b],
                constructor: consuming_constructor,
            }));
        registry
            .expect_component()
            .with(eq(b))
            .return_const(Some(definition::<B>(vec![])));
        registry
            .expect_component()
            .with(eq(c))
            .return_const(Some(definition::<C>(vec![])));

        let mut factory = create_factory(registry);
        let instance = factory.resolve(a).unwrap();
        let b_instance = factory.resolve(b).unwrap();
        let c_instance = factory.resolve(c).unwrap();

        let dependencies = instance
            .downcast::<Vec<ComponentInstanceAnyPtr>>()
            .unwrap();
        assert_eq!(dependencies.len(), 2);
        assert!(ComponentInstancePtr::ptr_eq(&dependencies[0], &c_instance));
        assert!(ComponentInstancePtr::ptr_eq(&dependencies[1], &b_instance));
    }

    #[test]
    fn should_forward_constructor_error() {
        let id = ClassId::of::<A>();

        let mut registry = MockComponentDefinitionRegistry::new();
        registry
            .expect_component()
            .with(eq(id))
            .times(1)
            .return_const(Some(ComponentDefinition {
                class: id,
                dependencies: vec![],
                constructor: error_constructor,
            }));

        let mut factory = create_factory(registry);
        assert_eq!(
            factory.resolve(id).unwrap_err(),
            ComponentInstanceProviderError::IncompatibleComponent(ClassId::of::<i8>())
        );
    }

    #[test]
    fn should_store_instance_in_scope() {
        let id = ClassId::of::<A>();

        let mut registry = MockComponentDefinitionRegistry::new();
        registry
            .expect_component()
            .with(eq(id))
            .times(1)
            .return_const(Some(definition::<A>(vec![])));

        let mut scope = MockScope::new();
        scope.expect_instance().return_const(None);
        scope
            .expect_store_instance()
            .with(eq(id), always())
            .times(1)
            .return_const(());

        let mut factory = ComponentFactory::new(
            Box::new(registry) as ComponentDefinitionRegistryPtr,
            Box::new(scope) as ScopePtr,
        );

        factory.resolve(id).unwrap();
    }
}
