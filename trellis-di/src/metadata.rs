//! Declarative facts attached to classes and methods live in a [MetadataStore]. Producers (the
//! annotation functions and the derive macros) write facts keyed by a [Subject] and a string key,
//! while consumers (the dependency resolver and route compilation) read them back.
//!
//! A store is an explicit object, rather than process-wide state. Types annotated with the derive
//! macros submit registration functions, which are replayed into a fresh store by
//! [MetadataStore::from_static]:
//!
//! ```
//! use trellis_di::metadata::{mark_injectable, ClassId, MetadataStore, INJECTABLE};
//!
//! struct UserService;
//!
//! let mut store = MetadataStore::default();
//! mark_injectable(&mut store, ClassId::of::<UserService>());
//!
//! assert_eq!(
//!     store.metadata_typed::<bool>(ClassId::of::<UserService>(), INJECTABLE),
//!     Some(&true)
//! );
//! ```
//!
//! ## Registration order
//!
//! All metadata must be registered before any resolution begins. Interleaving registration with
//! resolution is not supported.

use crate::error::MetadataError;
use fxhash::FxHashMap;
use std::any::{type_name, Any, TypeId};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use tracing::trace;

/// Key of the flag marking a class as injectable.
pub const INJECTABLE: &str = "injectable";

/// Type-erased metadata value.
pub type MetadataValuePtr = Box<dyn Any + Send + Sync>;

/// Opaque identifier of a class (a Rust type). Equality is based on type identity - the type name
/// is only carried for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct ClassId {
    type_id: TypeId,
    type_name: &'static str,
}

impl ClassId {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without the module path and generic arguments, e.g. `UserController`.
    pub fn name(&self) -> &'static str {
        let path = self
            .type_name
            .split_once('<')
            .map(|(path, _)| path)
            .unwrap_or(self.type_name);

        path.rsplit("::").next().unwrap_or(path)
    }
}

impl PartialEq for ClassId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ClassId {}

impl Hash for ClassId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl PartialOrd for ClassId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_id.cmp(&other.type_id)
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of a method declared on a class. Method metadata is attached to this identifier, not
/// to any particular instance of the class.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MethodId {
    class: ClassId,
    name: &'static str,
}

impl MethodId {
    #[inline]
    pub fn new(class: ClassId, name: &'static str) -> Self {
        Self { class, name }
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Display for MethodId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.class, self.name)
    }
}

/// Entity which metadata is attached to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Subject {
    Class(ClassId),
    Method(MethodId),
}

impl From<ClassId> for Subject {
    #[inline]
    fn from(value: ClassId) -> Self {
        Self::Class(value)
    }
}

impl From<MethodId> for Subject {
    #[inline]
    fn from(value: MethodId) -> Self {
        Self::Method(value)
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Class(class) => class.fmt(f),
            Subject::Method(method) => method.fmt(f),
        }
    }
}

/// Associative store of metadata records. Holds at most one value per (subject, key) pair - later
/// writes replace earlier ones.
#[derive(Default)]
pub struct MetadataStore {
    entries: FxHashMap<Subject, FxHashMap<String, MetadataValuePtr>>,
}

impl MetadataStore {
    /// Creates a new store populated with all statically submitted registrations.
    pub fn from_static() -> Result<Self, MetadataError> {
        let mut store = Self::default();
        for registerer in inventory::iter::<internal::MetadataRegisterer> {
            (registerer.register)(&mut store)?;
        }

        Ok(store)
    }

    /// Attaches `value` to given subject under `key`, replacing any previous value.
    pub fn set_metadata<V: Any + Send + Sync>(
        &mut self,
        subject: impl Into<Subject>,
        key: &str,
        value: V,
    ) {
        let subject = subject.into();
        trace!(%subject, key, "Setting metadata.");

        self.entries
            .entry(subject)
            .or_default()
            .insert(key.to_string(), Box::new(value));
    }

    /// Returns the type-erased value stored for given subject and key, if present.
    pub fn metadata(
        &self,
        subject: impl Into<Subject>,
        key: &str,
    ) -> Option<&(dyn Any + Send + Sync)> {
        self.entries
            .get(&subject.into())
            .and_then(|entries| entries.get(key))
            .map(|value| &**value)
    }

    /// Typesafe version of [MetadataStore::metadata]. A value of a different type is treated as
    /// absent.
    pub fn metadata_typed<V: Any>(&self, subject: impl Into<Subject>, key: &str) -> Option<&V> {
        self.metadata(subject, key)
            .and_then(|value| value.downcast_ref())
    }

    /// Mutable version of [MetadataStore::metadata_typed].
    pub fn metadata_typed_mut<V: Any>(
        &mut self,
        subject: impl Into<Subject>,
        key: &str,
    ) -> Option<&mut V> {
        self.entries
            .get_mut(&subject.into())
            .and_then(|entries| entries.get_mut(key))
            .and_then(|value| value.downcast_mut())
    }

    #[inline]
    pub fn has_metadata(&self, subject: impl Into<Subject>, key: &str) -> bool {
        self.metadata(subject, key).is_some()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.entries.values().map(|entries| entries.len()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Marks given class as injectable. The flag is informational - resolution does not depend on it.
pub fn mark_injectable(store: &mut MetadataStore, class: ClassId) {
    store.set_metadata(class, INJECTABLE, true);
}

/// Checks if given class has been marked as injectable.
pub fn is_injectable(store: &MetadataStore, class: ClassId) -> bool {
    store
        .metadata_typed::<bool>(class, INJECTABLE)
        .copied()
        .unwrap_or(false)
}

#[doc(hidden)]
pub mod internal {
    use crate::error::MetadataError;
    use crate::metadata::MetadataStore;
    use inventory::collect;
    pub use inventory::submit;

    pub struct MetadataRegisterer {
        pub register: fn(store: &mut MetadataStore) -> Result<(), MetadataError>,
    }

    collect!(MetadataRegisterer);
}
