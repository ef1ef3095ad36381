use crate::destination::Destination;
use crate::domain::property::Properties;
use crate::service_binding::ServiceBinding;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    /// One table of destination properties per destination
    #[serde(default)]
    pub destinations: Vec<Map<String, Value>>,
    #[serde(default)]
    pub service_bindings: Vec<ServiceBinding>,
    #[serde(default)]
    pub connectivity: ConnectivitySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConnectivitySettings {
    /// Token presented to the connectivity proxy
    pub proxy_token: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load `default`, `{ENVIRONMENT}` and `local` files from `directory`,
    /// then `DESTINATIONS__*` environment variables
    pub fn load_from(directory: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let directory = directory.as_ref();
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let file = |name: &str| File::with_name(&directory.join(name).to_string_lossy()).required(false);

        let config = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(file("default"))
            .add_source(file(&environment))
            .add_source(file("local"))
            .add_source(Environment::with_prefix("DESTINATIONS").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Configured destinations; `null` values are dropped, nested tables
    /// are kept as JSON text
    pub fn destinations(&self) -> impl Iterator<Item = Destination> + '_ {
        self.destinations
            .iter()
            .cloned()
            .map(|table| Destination::from_properties(Properties::from(table)))
    }
}
