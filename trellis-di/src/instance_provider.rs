use crate::component::Injectable;
pub use crate::error::ComponentInstanceProviderError;
use crate::metadata::ClassId;
#[cfg(test)]
use mockall::automock;
use std::any::Any;
use std::error::Error;
#[cfg(not(feature = "threadsafe"))]
use std::rc::Rc;
#[cfg(feature = "threadsafe")]
use std::sync::Arc;

#[cfg(not(feature = "threadsafe"))]
pub type ComponentInstancePtr<T> = Rc<T>;
#[cfg(feature = "threadsafe")]
pub type ComponentInstancePtr<T> = Arc<T>;

#[cfg(not(feature = "threadsafe"))]
pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + 'static>;
#[cfg(feature = "threadsafe")]
pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + Send + Sync + 'static>;

#[cfg(not(feature = "threadsafe"))]
pub type ErrorPtr = Rc<dyn Error + 'static>;
#[cfg(feature = "threadsafe")]
pub type ErrorPtr = Arc<dyn Error + Send + Sync + 'static>;

/// Converts any error into an [ErrorPtr].
#[cfg(feature = "threadsafe")]
pub fn convert_error<E: Error + Send + Sync + 'static>(error: E) -> ErrorPtr {
    Arc::new(error) as ErrorPtr
}

/// Converts any error into an [ErrorPtr].
#[cfg(not(feature = "threadsafe"))]
pub fn convert_error<E: Error + 'static>(error: E) -> ErrorPtr {
    Rc::new(error) as ErrorPtr
}

/// Generic provider for component instances.
#[cfg_attr(test, automock)]
pub trait ComponentInstanceProvider {
    /// Returns the single instance of a given component, creating it along with its dependencies
    /// if it doesn't exist yet.
    fn resolve(&mut self, class: ClassId)
        -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError>;
}

/// Helper trait for [ComponentInstanceProvider] providing strongly-typed access.
pub trait TypedComponentInstanceProvider {
    /// Typesafe version of [ComponentInstanceProvider::resolve].
    fn resolve_typed<T: Injectable>(
        &mut self,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError>;
}

impl<CIP: ComponentInstanceProvider + ?Sized> TypedComponentInstanceProvider for CIP {
    fn resolve_typed<T: Injectable>(
        &mut self,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        self.resolve(ClassId::of::<T>())?
            .downcast::<T>()
            .map_err(|_| ComponentInstanceProviderError::IncompatibleComponent(ClassId::of::<T>()))
    }
}

/// Instances of declared dependencies, passed positionally to a component constructor.
#[derive(Debug)]
pub struct ResolvedDependencies {
    owner: ClassId,
    declared: usize,
    instances: std::vec::IntoIter<ComponentInstanceAnyPtr>,
}

impl ResolvedDependencies {
    pub fn new(owner: ClassId, instances: Vec<ComponentInstanceAnyPtr>) -> Self {
        Self {
            owner,
            declared: instances.len(),
            instances: instances.into_iter(),
        }
    }

    /// Takes the next dependency in declaration order.
    pub fn next_instance(&mut self) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        self.instances.next().ok_or(
            ComponentInstanceProviderError::MissingDependencyArgument {
                owner: self.owner,
                declared: self.declared,
            },
        )
    }

    /// Typesafe version of [ResolvedDependencies::next_instance].
    pub fn next_typed<T: Injectable>(
        &mut self,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        self.next_instance()?
            .downcast::<T>()
            .map_err(|_| ComponentInstanceProviderError::IncompatibleComponent(ClassId::of::<T>()))
    }

    /// Number of dependencies not taken yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::component::Injectable;
    use crate::instance_provider::{
        ComponentInstanceAnyPtr, ComponentInstanceProviderError, ComponentInstancePtr,
        MockComponentInstanceProvider, ResolvedDependencies, TypedComponentInstanceProvider,
    };
    use crate::metadata::ClassId;
    use mockall::predicate::*;

    #[derive(Debug)]
    struct TestComponent;

    impl Injectable for TestComponent {}

    #[test]
    fn should_take_dependencies_in_order() {
        let owner = ClassId::of::<u8>();
        let mut dependencies = ResolvedDependencies::new(
            owner,
            vec![
                ComponentInstancePtr::new(TestComponent) as ComponentInstanceAnyPtr,
                ComponentInstancePtr::new(1i8) as ComponentInstanceAnyPtr,
            ],
        );

        assert!(dependencies.next_typed::<TestComponent>().is_ok());
        assert_eq!(dependencies.remaining(), 1);
        assert_eq!(
            dependencies.next_typed::<TestComponent>().unwrap_err(),
            ComponentInstanceProviderError::IncompatibleComponent(ClassId::of::<TestComponent>())
        );
        assert_eq!(
            dependencies.next_instance().unwrap_err(),
            ComponentInstanceProviderError::MissingDependencyArgument { owner, declared: 2 }
        );
    }

    #[test]
    fn should_resolve_typed_instance() {
        let mut instance_provider = MockComponentInstanceProvider::new();
        instance_provider
            .expect_resolve()
            .with(eq(ClassId::of::<TestComponent>()))
            .times(1)
            .returning(|_| Ok(ComponentInstancePtr::new(TestComponent) as ComponentInstanceAnyPtr));

        assert!(instance_provider.resolve_typed::<TestComponent>().is_ok());
    }
}
