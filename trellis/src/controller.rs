//! Functionality related to defining controllers - components whose methods are exposed as route
//! handlers.
//!
//! A controller declares its base path and a prototype: the ordered table of its members. Route
//! metadata (an [HttpVerb] and a path) is then attached to individual methods of the prototype.
//! The `#[controller]` attribute does all of this for an impl block:
//!
//! ```
//! use trellis::controller;
//! use trellis_di::Component;
//!
//! #[derive(Component)]
//! struct UserController;
//!
//! #[controller(path = "/users")]
//! impl UserController {
//!     #[get("/")]
//!     fn get_all_users(&self) {
//!         println!("Returning all users...");
//!     }
//!
//!     #[post("/")]
//!     fn create_user(&self) {
//!         println!("Creating user...");
//!     }
//! }
//! ```
//!
//! Route handlers take only `&self` and return either `()` or `Result<(), E>`, where `E` is an
//! error type.

use derivative::Derivative;
use std::error::Error;
use std::fmt::{Display, Formatter};
use trellis_di::component::Injectable;
use trellis_di::error::MetadataError;
use trellis_di::instance_provider::{
    convert_error, ComponentInstanceAnyPtr, ComponentInstanceProviderError, ErrorPtr,
};
use trellis_di::metadata::{ClassId, MetadataStore, MethodId};

/// Key of the base path of a controller.
pub const BASE_PATH: &str = "basePath";

/// Key of the [HttpVerb] of a route method.
pub const METHOD: &str = "method";

/// Key of the path of a route method.
pub const PATH: &str = "path";

/// Key of the [ControllerPrototype] of a class.
pub const PROTOTYPE: &str = "prototype";

/// Type-erased method invocation on a controller instance.
pub type MethodHandler = fn(instance: &ComponentInstanceAnyPtr) -> Result<(), ErrorPtr>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum HttpVerb {
    Get,
    Post,
}

impl Display for HttpVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
        })
    }
}

/// A member declared on a class.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum Member {
    Method {
        name: &'static str,
        #[derivative(Debug = "ignore")]
        handler: MethodHandler,
    },
    Property {
        name: &'static str,
    },
}

impl Member {
    pub fn name(&self) -> &'static str {
        match self {
            Member::Method { name, .. } | Member::Property { name } => name,
        }
    }

    /// Returns the handler, if this member is callable.
    pub fn handler(&self) -> Option<MethodHandler> {
        match self {
            Member::Method { handler, .. } => Some(*handler),
            Member::Property { .. } => None,
        }
    }
}

/// Ordered table of members declared on a class.
#[derive(Clone, Debug)]
pub struct ControllerPrototype {
    class: ClassId,
    members: Vec<Member>,
}

impl ControllerPrototype {
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            members: vec![],
        }
    }

    pub fn with_method(mut self, name: &'static str, handler: MethodHandler) -> Self {
        self.members.push(Member::Method { name, handler });
        self
    }

    pub fn with_property(mut self, name: &'static str) -> Self {
        self.members.push(Member::Property { name });
        self
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.name() == name)
    }

    /// Callable members in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = (MethodId, MethodHandler)> + '_ {
        self.members.iter().filter_map(|member| {
            member
                .handler()
                .map(|handler| (MethodId::new(self.class, member.name()), handler))
        })
    }
}

/// Attaches the prototype to its class. A class can declare its members only once, since the order
/// of static registrations is not stable.
pub fn declare_prototype(
    store: &mut MetadataStore,
    prototype: ControllerPrototype,
) -> Result<(), MetadataError> {
    let class = prototype.class;
    if store.has_metadata(class, PROTOTYPE) {
        return Err(MetadataError::DuplicatePrototype(class));
    }

    store.set_metadata(class, PROTOTYPE, prototype);
    Ok(())
}

pub fn prototype(store: &MetadataStore, class: ClassId) -> Option<&ControllerPrototype> {
    store.metadata_typed(class, PROTOTYPE)
}

/// Marks given class as a controller with a base path, prepended to all its route paths.
pub fn mark_controller<P: Into<String>>(store: &mut MetadataStore, class: ClassId, base_path: P) {
    store.set_metadata(class, BASE_PATH, base_path.into());
}

pub fn base_path(store: &MetadataStore, class: ClassId) -> Option<&str> {
    store
        .metadata_typed::<String>(class, BASE_PATH)
        .map(String::as_str)
}

/// Marks given method as a route. The method needs to be a callable member of the prototype
/// declared for its class.
pub fn mark_route<P: Into<String>>(
    store: &mut MetadataStore,
    method: MethodId,
    verb: HttpVerb,
    path: P,
) -> Result<(), MetadataError> {
    let callable = prototype(store, method.class())
        .and_then(|prototype| prototype.member(method.name()))
        .and_then(Member::handler)
        .is_some();

    if !callable {
        return Err(MetadataError::DecoratorTarget {
            class: method.class(),
            member: method.name(),
        });
    }

    store.set_metadata(method, METHOD, verb);
    store.set_metadata(method, PATH, path.into());

    Ok(())
}

/// Returns the verb and path of given method, if both are present.
pub fn route(store: &MetadataStore, method: MethodId) -> Option<(HttpVerb, &str)> {
    let verb = store.metadata_typed::<HttpVerb>(method, METHOD)?;
    let path = store.metadata_typed::<String>(method, PATH)?;

    Some((*verb, path.as_str()))
}

/// Converts route handler results into a common form.
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> Result<(), ErrorPtr>;
}

impl IntoHandlerResult for () {
    #[inline]
    fn into_handler_result(self) -> Result<(), ErrorPtr> {
        Ok(())
    }
}

#[cfg(feature = "threadsafe")]
impl<E: Error + Send + Sync + 'static> IntoHandlerResult for Result<(), E> {
    #[inline]
    fn into_handler_result(self) -> Result<(), ErrorPtr> {
        self.map_err(convert_error)
    }
}

#[cfg(not(feature = "threadsafe"))]
impl<E: Error + 'static> IntoHandlerResult for Result<(), E> {
    #[inline]
    fn into_handler_result(self) -> Result<(), ErrorPtr> {
        self.map_err(convert_error)
    }
}

/// Casts a type-erased instance back to the controller type.
pub fn downcast_controller<T: Injectable>(instance: &ComponentInstanceAnyPtr) -> Result<&T, ErrorPtr> {
    instance.downcast_ref::<T>().ok_or_else(|| {
        convert_error(ComponentInstanceProviderError::IncompatibleComponent(
            ClassId::of::<T>(),
        ))
    })
}
