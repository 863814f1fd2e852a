//! Configuration model loaded from external sources.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::types::PageSize;

#[derive(Clone, Debug, Deserialize)]
/// Settings for the console front end.
pub struct OrderDeskConfig {
    /// Rows per page in the order table.
    #[serde(default)]
    pub page_size: PageSize,
    /// Glob matched by the template engine.
    pub templates_dir: String,
    /// JSON file with the orders served by the in-memory repository.
    pub seed_file: Option<String>,
    /// Number of demo orders generated when no seed file is configured.
    #[serde(default = "default_demo_orders")]
    pub demo_orders: usize,
    /// Artificial delay added to every repository call.
    #[serde(default)]
    pub repository_latency_ms: u64,
}

fn default_demo_orders() -> usize {
    45
}

impl OrderDeskConfig {
    /// Layers `{dir}/default`, `{dir}/{app_env}` (optional) and `APP_*` variables.
    pub fn load(config_dir: impl AsRef<Path>, app_env: &str) -> Result<Self, ConfigError> {
        let dir = config_dir.as_ref();
        Config::builder()
            .add_source(File::with_name(&dir.join("default").to_string_lossy()))
            .add_source(File::with_name(&dir.join(app_env).to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }

    pub fn repository_latency(&self) -> Duration {
        Duration::from_millis(self.repository_latency_ms)
    }
}
