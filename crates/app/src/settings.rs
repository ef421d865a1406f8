//! Host settings.
//!
//! Read from an optional TOML file (`settings.toml` unless `--config` says
//! otherwise) layered with `WALLETBOOK__*` environment variables, e.g.
//! `WALLETBOOK__APP__LEVEL=debug`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level for the `walletbook` and `engine` targets.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    /// Volatile in-process store.
    #[default]
    Memory,
    /// Path of a sqlite file, created when missing.
    Sqlite(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("WALLETBOOK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
