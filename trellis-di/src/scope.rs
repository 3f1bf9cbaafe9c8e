//! Component instances are contained in [Scope]s - containers which decide when to reuse an
//! instance. Components are singletons: the [SingletonScope] keeps exactly one instance per class
//! for as long as the scope lives.

use crate::instance_provider::ComponentInstanceAnyPtr;
use crate::metadata::ClassId;
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;

#[cfg(not(feature = "threadsafe"))]
pub type ScopePtr = Box<dyn Scope>;
#[cfg(feature = "threadsafe")]
pub type ScopePtr = Box<dyn Scope + Send + Sync>;

/// A scope containing component instances. See module documentation for information on scopes.
#[cfg_attr(test, automock)]
pub trait Scope {
    /// Gets an instance of given class, if available in this scope.
    fn instance(&self, class: ClassId) -> Option<ComponentInstanceAnyPtr>;

    /// Stores given instance in the scope.
    fn store_instance(&mut self, class: ClassId, instance: ComponentInstanceAnyPtr);
}

/// Scope for instances shared between all dependents.
#[derive(Default)]
pub struct SingletonScope {
    instances: FxHashMap<ClassId, ComponentInstanceAnyPtr>,
}

impl SingletonScope {
    /// Number of stored instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Scope for SingletonScope {
    #[inline]
    fn instance(&self, class: ClassId) -> Option<ComponentInstanceAnyPtr> {
        self.instances.get(&class).cloned()
    }

    #[inline]
    fn store_instance(&mut self, class: ClassId, instance: ComponentInstanceAnyPtr) {
        self.instances.insert(class, instance);
    }
}
