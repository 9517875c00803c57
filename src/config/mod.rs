//! Builds an `AppConfig` from config files and the environment.
//!
//! `config/base.toml` is always loaded and then overlaid with `config/{environment}.toml`,
//! the environment being selected by `APP_ENVIRONMENT` (defaults to `local`).
//! Environment variables prefixed with `APP_` win over both files, nested keys are
//! separated by `__`, e.g. `APP_KLAVIYO_CONFIG__API_KEY`.
//!
//! The resulting `AppConfig` is built once in `main` and handed to the `App`.

mod error;
mod structs;

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

pub use error::{ConfigError, ConfigResult};
pub use structs::{AppConfig, CorsConfig, Environment, KlaviyoConfig, NetConfig};

pub const ENV_PREFIX: &str = "APP_";
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

impl AppConfig {
    /// Loads the configuration from the `config` directory in the current working directory
    /// and the process environment.
    pub fn load() -> ConfigResult<Self> {
        let config_dir = std::env::current_dir()?.join("config");
        let environment: Environment = std::env::var(ENVIRONMENT_VAR)
            .unwrap_or_else(|_| "local".into())
            .try_into()?;

        Self::load_from(config_dir, environment)
    }

    pub fn load_from(config_dir: impl AsRef<Path>, environment: Environment) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());
        info!(
            "{:<12} - Loading configuration for: {}",
            "CONFIG",
            environment.as_ref()
        );

        let config: AppConfig = Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["environment"]).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }
}
