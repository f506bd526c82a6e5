//! Configuration loading: TOML file merged with `APP_`-prefixed env vars.

use crate::config::AppConfig;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

/// Loads `AppConfig` from `config/Config.toml`, with `APP_`-prefixed
/// environment variables taking precedence (grounded in
/// `andrew-starosciak-deep-algo`'s `ConfigLoader`).
pub struct ConfigLoader;

impl ConfigLoader {
    /// # Errors
    /// Returns an error if the config file is missing required keys or the
    /// TOML/env values fail to parse into `AppConfig`.
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from("config/Config.toml")
    }

    /// Loads from an explicit path, for the CLI's `--config` override.
    ///
    /// # Errors
    /// Returns an error if the config file is missing required keys or the
    /// TOML/env values fail to parse into `AppConfig`.
    pub fn load_from(path: &str) -> Result<AppConfig, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("APP_").split("_"))
            .extract()
    }
}
