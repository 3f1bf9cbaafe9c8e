//! Framework configuration used by the [Application](crate::application::Application) to
//! configure bootstrapping.
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by `trellis.json` file or environment variables prefixed with `TRELLIS_`.

use crate::router::DuplicateRoutePolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "TRELLIS";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "trellis.json";

/// Framework configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationConfig {
    /// Should a default tracing logger be installed in the scope of the application.
    pub install_tracing_logger: bool,
    /// Should every compiled route be invoked once after bootstrapping.
    pub invoke_handlers: bool,
    /// What to do with routes mapped more than once.
    pub duplicate_routes: DuplicateRoutePolicy,
    /// Should registering a component type twice replace the earlier definition.
    pub allow_definition_overriding: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            invoke_handlers: true,
            duplicate_routes: DuplicateRoutePolicy::default(),
            allow_definition_overriding: false,
        }
    }
}

impl From<OptionalApplicationConfig> for ApplicationConfig {
    fn from(value: OptionalApplicationConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            invoke_handlers: value.invoke_handlers.unwrap_or(default.invoke_handlers),
            duplicate_routes: value.duplicate_routes.unwrap_or(default.duplicate_routes),
            allow_definition_overriding: value
                .allow_definition_overriding
                .unwrap_or(default.allow_definition_overriding),
        }
    }
}

impl ApplicationConfig {
    /// Loads the config from the default config file and the environment.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(Self::from_config)
    }

    /// Reads the config from given source. Missing values are filled with defaults.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config
            .try_deserialize::<OptionalApplicationConfig>()
            .map(|config| config.into())
    }
}

#[derive(Deserialize)]
struct OptionalApplicationConfig {
    install_tracing_logger: Option<bool>,
    invoke_handlers: Option<bool>,
    duplicate_routes: Option<DuplicateRoutePolicy>,
    allow_definition_overriding: Option<bool>,
}
