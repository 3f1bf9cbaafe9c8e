//! Core application framework functionality.

use crate::config::ApplicationConfig;
use crate::module::{module_manifest, Module};
use crate::router::{RouteCompiler, RouteTable, RouterError};
use fxhash::FxHashMap;
use std::collections::hash_map::Entry;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use trellis_di::component::Injectable;
use trellis_di::component_registry::DefaultComponentDefinitionRegistry;
use trellis_di::error::{
    ComponentDefinitionRegistryError, ComponentInstanceProviderError, MetadataError,
};
use trellis_di::factory::ComponentFactory;
use trellis_di::instance_provider::{
    convert_error, ComponentInstanceAnyPtr, ComponentInstanceProvider, ComponentInstancePtr,
    ErrorPtr, TypedComponentInstanceProvider,
};
use trellis_di::metadata::{ClassId, MetadataStore, MethodId};
use trellis_di::scope::SingletonScope;

#[derive(Clone, Error, Debug)]
pub enum ApplicationError {
    #[error("Error loading configuration: {0}")]
    ConfigError(ErrorPtr),
    #[error("Error registering components: {0}")]
    RegistryError(#[from] ComponentDefinitionRegistryError),
    #[error("Error registering metadata: {0}")]
    MetadataError(#[from] MetadataError),
    #[error("Error compiling routes: {0}")]
    RouterError(#[from] RouterError),
    #[error("Error resolving component: {0}")]
    ResolutionError(#[from] ComponentInstanceProviderError),
    #[error("Error invoking {method}(): {error}")]
    HandlerError { method: MethodId, error: ErrorPtr },
}

/// Main entrypoint for the application. Owns the component definitions and metadata, and
/// bootstraps [Modules](Module) into [RouteTables](RouteTable). Component instances of each
/// module live as long as the application.
pub struct Application {
    definition_registry: DefaultComponentDefinitionRegistry,
    metadata: MetadataStore,
    config: ApplicationConfig,
    factories: FxHashMap<ClassId, ComponentFactory>,
}

/// Creates an application with all statically registered components and metadata, configured
/// from the environment.
pub fn create_default() -> Result<Application, ApplicationError> {
    let config = ApplicationConfig::init_from_environment()
        .map_err(|error| ApplicationError::ConfigError(convert_error(error)))?;

    create_with_config(config)
}

/// Creates an application with all statically registered components and metadata.
pub fn create_with_config(config: ApplicationConfig) -> Result<Application, ApplicationError> {
    let definition_registry =
        DefaultComponentDefinitionRegistry::from_static(config.allow_definition_overriding)?;
    let metadata = MetadataStore::from_static()?;

    Ok(Application::new(definition_registry, metadata, config))
}

impl Application {
    pub fn new(
        definition_registry: DefaultComponentDefinitionRegistry,
        metadata: MetadataStore,
        config: ApplicationConfig,
    ) -> Self {
        Self {
            definition_registry,
            metadata,
            config,
            factories: Default::default(),
        }
    }

    #[inline]
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    #[inline]
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Typesafe version of [Application::bootstrap_module].
    pub fn bootstrap<M: Module>(&mut self) -> Result<RouteTable, ApplicationError> {
        self.bootstrap_module(ClassId::of::<M>())
    }

    /// Resolves all providers and controllers of given module, compiles its routes and, if
    /// enabled, invokes each route once in table order. Only classes listed in the module
    /// manifest can be resolved. Bootstrapping a module again reuses its existing instances.
    pub fn bootstrap_module(&mut self, module: ClassId) -> Result<RouteTable, ApplicationError> {
        if self.config.install_tracing_logger {
            install_tracing_logger();
        }

        info!(%module, "Bootstrapping module...");

        let factory = module_factory(
            &mut self.factories,
            &self.definition_registry,
            &self.metadata,
            module,
        )?;

        let routes = RouteCompiler::new(&self.metadata, self.config.duplicate_routes)
            .compile(factory, module)?;

        info!(routes = routes.len(), "Module bootstrapped.");

        if self.config.invoke_handlers {
            for route in &routes {
                debug!(method = %route.method(), "Invoking route handler.");

                route
                    .invoke()
                    .map_err(|error| ApplicationError::HandlerError {
                        method: route.method(),
                        error,
                    })?;
            }
        }

        Ok(routes)
    }

    /// Typesafe version of [Application::resolve_in_module].
    pub fn resolve<M: Module, T: Injectable>(
        &mut self,
    ) -> Result<ComponentInstancePtr<T>, ApplicationError> {
        let factory = module_factory(
            &mut self.factories,
            &self.definition_registry,
            &self.metadata,
            ClassId::of::<M>(),
        )?;

        factory.resolve_typed::<T>().map_err(Into::into)
    }

    /// Returns the instance of given class from the scope of given module, creating it if the
    /// module hasn't constructed it yet.
    pub fn resolve_in_module(
        &mut self,
        module: ClassId,
        class: ClassId,
    ) -> Result<ComponentInstanceAnyPtr, ApplicationError> {
        let factory = module_factory(
            &mut self.factories,
            &self.definition_registry,
            &self.metadata,
            module,
        )?;

        factory.resolve(class).map_err(Into::into)
    }
}

// one factory per module, restricted to the classes in its manifest
fn module_factory<'a>(
    factories: &'a mut FxHashMap<ClassId, ComponentFactory>,
    definition_registry: &DefaultComponentDefinitionRegistry,
    metadata: &MetadataStore,
    module: ClassId,
) -> Result<&'a mut ComponentFactory, RouterError> {
    match factories.entry(module) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => {
            let manifest = module_manifest(metadata, module)
                .ok_or(RouterError::MissingModuleManifest(module))?;

            debug!(%module, "Creating module component factory.");

            Ok(entry.insert(ComponentFactory::new(
                Box::new(definition_registry.scoped(manifest.classes())),
                Box::<SingletonScope>::default(),
            )))
        }
    }
}

// an already installed global subscriber takes precedence
fn install_tracing_logger() {
    if let Err(error) = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        debug!("Not installing tracing logger: {error}");
    }
}
