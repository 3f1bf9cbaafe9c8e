#[cfg(feature = "derive")]
mod component_derive_test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trellis_di::component::Component;
    use trellis_di::component_registry::{
        ComponentDefinition, ComponentDefinitionRegistry, DefaultComponentDefinitionRegistry,
    };
    use trellis_di::factory::ComponentFactoryBuilder;
    use trellis_di::instance_provider::{
        ComponentInstanceProviderError, ComponentInstancePtr, TypedComponentInstanceProvider,
    };
    use trellis_di::metadata::{is_injectable, ClassId, MetadataStore};
    use trellis_di::Component;

    static SHARED_CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

    fn count_construction() -> usize {
        SHARED_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[derive(Component)]
    #[injectable]
    struct SharedDependency {
        #[component(default = "count_construction")]
        construction: usize,
    }

    #[derive(Component)]
    struct LeftDependency {
        shared: ComponentInstancePtr<SharedDependency>,
    }

    #[derive(Component)]
    struct RightDependency(ComponentInstancePtr<SharedDependency>);

    #[derive(Component)]
    struct DiamondComponent {
        left: ComponentInstancePtr<LeftDependency>,
        right: ComponentInstancePtr<RightDependency>,
        #[component(default)]
        value: i8,
    }

    #[derive(Component)]
    struct CycleStart {
        _next: ComponentInstancePtr<CycleEnd>,
    }

    #[derive(Component)]
    struct CycleEnd {
        _next: ComponentInstancePtr<CycleStart>,
    }

    #[derive(Component)]
    struct UnitComponent;

    #[test]
    fn should_declare_dependencies_in_field_order() {
        assert_eq!(
            DiamondComponent::dependencies(),
            vec![
                ClassId::of::<LeftDependency>(),
                ClassId::of::<RightDependency>()
            ]
        );
        assert!(UnitComponent::dependencies().is_empty());
    }

    #[test]
    fn should_register_static_definitions() {
        let registry = DefaultComponentDefinitionRegistry::from_static(false).unwrap();

        assert!(registry.is_registered(ClassId::of::<DiamondComponent>()));
        assert!(registry.is_registered(ClassId::of::<UnitComponent>()));
        assert_eq!(
            registry
                .component(ClassId::of::<RightDependency>())
                .map(|definition: ComponentDefinition| definition.dependencies),
            Some(vec![ClassId::of::<SharedDependency>()])
        );
    }

    #[test]
    fn should_mark_injectable_components() {
        let store = MetadataStore::from_static().unwrap();

        assert!(is_injectable(&store, ClassId::of::<SharedDependency>()));
        assert!(!is_injectable(&store, ClassId::of::<UnitComponent>()));
    }

    #[test]
    fn should_construct_diamond_once() {
        let mut factory = ComponentFactoryBuilder::new().unwrap().build();

        let component = factory.resolve_typed::<DiamondComponent>().unwrap();
        let shared = factory.resolve_typed::<SharedDependency>().unwrap();

        assert!(ComponentInstancePtr::ptr_eq(&component.left.shared, &shared));
        assert!(ComponentInstancePtr::ptr_eq(&component.right.0, &shared));
        assert!(ComponentInstancePtr::ptr_eq(
            &component,
            &factory.resolve_typed::<DiamondComponent>().unwrap()
        ));
        assert_eq!(component.value, 0);
        assert_eq!(shared.construction, 1);
        assert_eq!(SHARED_CONSTRUCTIONS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_detect_cycles() {
        let mut factory = ComponentFactoryBuilder::new().unwrap().build();

        assert_eq!(
            factory.resolve_typed::<CycleStart>().err(),
            Some(ComponentInstanceProviderError::DependencyCycle(vec![
                ClassId::of::<CycleStart>(),
                ClassId::of::<CycleEnd>(),
                ClassId::of::<CycleStart>(),
            ]))
        );
    }

    #[test]
    fn should_not_resolve_unregistered_components() {
        let mut factory = ComponentFactoryBuilder::new()
            .unwrap()
            .with_definition_registry(Box::new(DefaultComponentDefinitionRegistry::new(false)))
            .build();

        assert_eq!(
            factory.resolve_typed::<UnitComponent>().err(),
            Some(ComponentInstanceProviderError::UnresolvableProvider(
                ClassId::of::<UnitComponent>()
            ))
        );
    }
}
