//! Modules group providers and controllers into a unit which can be bootstrapped by an
//! [Application](crate::application::Application). The manifest of a module is a part of its
//! metadata and is usually declared with `#[derive(Module)]`:
//!
//! ```
//! use trellis::controller;
//! use trellis::Module;
//! use trellis_di::Component;
//!
//! #[derive(Component)]
//! struct UserService;
//!
//! #[derive(Component)]
//! struct UserController;
//!
//! #[controller(path = "/users")]
//! impl UserController {}
//!
//! #[derive(Module)]
//! #[module(providers = [UserService], controllers = [UserController])]
//! struct UsersModule;
//! ```

use derive_more::Constructor;
use trellis_di::metadata::{ClassId, MetadataStore};

/// Key of the [ModuleManifest] of a module class.
pub const MODULE_METADATA: &str = "module:metadata";

/// Lists of classes grouped by a module. Both lists are processed in declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Constructor)]
pub struct ModuleManifest {
    pub providers: Vec<ClassId>,
    pub controllers: Vec<ClassId>,
}

impl ModuleManifest {
    /// All classes which can be resolved in the scope of the module.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.providers
            .iter()
            .chain(self.controllers.iter())
            .copied()
    }
}

/// A type which declares a [ModuleManifest].
pub trait Module: 'static {
    fn manifest() -> ModuleManifest;
}

/// Attaches the manifest to given module class.
pub fn mark_module(store: &mut MetadataStore, class: ClassId, manifest: ModuleManifest) {
    store.set_metadata(class, MODULE_METADATA, manifest);
}

pub fn module_manifest(store: &MetadataStore, class: ClassId) -> Option<&ModuleManifest> {
    store.metadata_typed(class, MODULE_METADATA)
}
