//! One of the basic blocks of dependency injection is a [Component]. Components are injectable
//! objects, which themselves can contain dependencies to other components.
//!
//! ## Registering components
//!
//! Any type which wants to be managed by the DI system, needs to implement `Component`. For
//! convenience, the trait can be automatically derived with all infrastructure if the `derive`
//! feature is enabled:
//!
//! ```
//! use trellis_di::instance_provider::ComponentInstancePtr;
//! use trellis_di::Component;
//!
//! #[derive(Component)]
//! #[injectable]
//! struct TestDependency;
//!
//! #[derive(Component)]
//! struct TestComponent {
//!     // dependencies are resolved in field declaration order
//!     dependency: ComponentInstancePtr<TestDependency>,
//!     #[component(default)]
//!     default: i8,
//!     #[component(default = "dummy_expr")]
//!     default_expr: i8,
//! }
//!
//! fn dummy_expr() -> i8 {
//!     -1
//! }
//! ```
//!
//! ### Supported `#[component]` field configuration
//!
//! * `default` - use `Default::default()` initialization
//! * `default = "expr"` - call `expr()` for initialization
//!
//! Fields without configuration are dependencies and need to be [ComponentInstancePtr]s.
//!
//! The `#[injectable]` struct attribute attaches the informational `injectable` flag to the
//! component's metadata. Resolution works the same with or without it.
//!
//! ## Manual implementation
//!
//! Without derive, the declared dependency list and the constructor need to agree - the
//! constructor receives instances in the order returned from [Component::dependencies]. A component
//! which doesn't declare any dependencies is constructed without arguments.
//!
//! [ComponentInstancePtr]: crate::instance_provider::ComponentInstancePtr

use crate::error::ComponentInstanceProviderError;
use crate::instance_provider::ResolvedDependencies;
use crate::metadata::ClassId;

/// Base trait for components for dependency injection.
///
/// Components might depend on other components, which forms the basis for dependency injection.
/// Please see the module-level documentation for more information.
pub trait Component: Injectable + Sized {
    /// Declared dependencies, in the order they are passed to [Component::create].
    fn dependencies() -> Vec<ClassId> {
        Vec::new()
    }

    /// Creates an instance of this component using resolved dependencies.
    fn create(dependencies: &mut ResolvedDependencies)
        -> Result<Self, ComponentInstanceProviderError>;
}

/// Marker trait for injectable types.
#[cfg(feature = "threadsafe")]
pub trait Injectable: Send + Sync + 'static {}

/// Marker trait for injectable types.
#[cfg(not(feature = "threadsafe"))]
pub trait Injectable: 'static {}
