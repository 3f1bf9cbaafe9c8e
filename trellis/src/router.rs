//! Compilation of route tables. The [RouteCompiler] walks the manifest of a module, resolves its
//! providers and controllers, and maps every routed controller method to a [RouteEntry].

use crate::controller::{base_path, prototype, route, HttpVerb, MethodHandler};
use crate::module::module_manifest;
use derivative::Derivative;
use derive_more::Constructor;
use fxhash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use trellis_di::error::ComponentInstanceProviderError;
use trellis_di::instance_provider::{ComponentInstanceAnyPtr, ComponentInstanceProvider, ErrorPtr};
use trellis_di::metadata::{ClassId, MetadataStore, MethodId};

#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum RouterError {
    #[error("Module '{0}' has no manifest - is it marked as a module?")]
    MissingModuleManifest(ClassId),
    #[error("Error resolving module component: {0}")]
    ProviderResolution(#[from] ComponentInstanceProviderError),
    #[error("Route {verb} {path} is mapped to both {existing}() and {duplicate}()")]
    DuplicateRoute {
        verb: HttpVerb,
        path: String,
        existing: MethodId,
        duplicate: MethodId,
    },
}

/// What to do when two handlers map to the same verb and path.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRoutePolicy {
    /// Keep both entries.
    Allow,
    /// Keep both entries and log a warning.
    #[default]
    Warn,
    /// Fail compilation.
    Reject,
}

/// A compiled route: handler bound to its controller instance.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct RouteEntry {
    verb: HttpVerb,
    full_path: String,
    method: MethodId,
    #[derivative(Debug = "ignore")]
    controller: ComponentInstanceAnyPtr,
    #[derivative(Debug = "ignore")]
    handler: MethodHandler,
}

impl RouteEntry {
    #[inline]
    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    /// Base path of the controller followed by the path of the method.
    #[inline]
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    #[inline]
    pub fn method(&self) -> MethodId {
        self.method
    }

    #[inline]
    pub fn controller(&self) -> &ComponentInstanceAnyPtr {
        &self.controller
    }

    /// Calls the handler on its controller instance.
    pub fn invoke(&self) -> Result<(), ErrorPtr> {
        (self.handler)(&self.controller)
    }
}

/// Routes in registration order.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the route for given verb and path. Later entries shadow earlier ones.
    pub fn find(&self, verb: HttpVerb, path: &str) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.verb == verb && entry.full_path == path)
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteEntry;
    type IntoIter = std::slice::Iter<'a, RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds [RouteTable]s from metadata.
#[derive(Constructor)]
pub struct RouteCompiler<'a> {
    metadata: &'a MetadataStore,
    duplicate_routes: DuplicateRoutePolicy,
}

impl RouteCompiler<'_> {
    /// Compiles routes of given module. Providers are resolved first, followed by controllers,
    /// both in manifest order.
    pub fn compile(
        &self,
        instance_provider: &mut dyn ComponentInstanceProvider,
        module: ClassId,
    ) -> Result<RouteTable, RouterError> {
        let manifest = module_manifest(self.metadata, module)
            .ok_or(RouterError::MissingModuleManifest(module))?;

        info!(
            %module,
            providers = manifest.providers.len(),
            controllers = manifest.controllers.len(),
            "Compiling routes..."
        );

        for provider in &manifest.providers {
            instance_provider.resolve(*provider)?;
        }

        let mut entries = vec![];
        let mut mapped: FxHashMap<(HttpVerb, String), MethodId> = Default::default();

        for controller in &manifest.controllers {
            let instance = instance_provider.resolve(*controller)?;
            let base_path = base_path(self.metadata, *controller).unwrap_or_default();

            let prototype = match prototype(self.metadata, *controller) {
                Some(prototype) => prototype,
                None => {
                    debug!(%controller, "Controller declares no members.");
                    continue;
                }
            };

            for (method, handler) in prototype.methods() {
                let (verb, path) = match route(self.metadata, method) {
                    Some(route) => route,
                    None => continue,
                };

                let full_path = format!("{base_path}{path}");
                self.check_duplicate(&mut mapped, verb, &full_path, method)?;

                info!("Mapped {verb} {full_path} -> {method}()");

                entries.push(RouteEntry {
                    verb,
                    full_path,
                    method,
                    controller: instance.clone(),
                    handler,
                });
            }
        }

        Ok(RouteTable { entries })
    }

    fn check_duplicate(
        &self,
        mapped: &mut FxHashMap<(HttpVerb, String), MethodId>,
        verb: HttpVerb,
        full_path: &str,
        method: MethodId,
    ) -> Result<(), RouterError> {
        let existing = match mapped.insert((verb, full_path.to_string()), method) {
            Some(existing) => existing,
            None => return Ok(()),
        };

        match self.duplicate_routes {
            DuplicateRoutePolicy::Allow => Ok(()),
            DuplicateRoutePolicy::Warn => {
                warn!("Route {verb} {full_path} of {existing}() is shadowed by {method}()");
                Ok(())
            }
            DuplicateRoutePolicy::Reject => Err(RouterError::DuplicateRoute {
                verb,
                path: full_path.to_string(),
                existing,
                duplicate: method,
            }),
        }
    }
}
