use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_SOURCE_URL: &str =
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-hist-90d.xml";

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    100
}

fn default_batch_size() -> usize {
    25
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    pub table_name: String,
    /// Alternate location of the keyspace. Defaults to the platform data dir.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            table_name: "exchange-rates".to_string(),
            endpoint: None,
            page_size: default_page_size(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: SourceConfig::default(),
            store: StoreConfig::default(),
            base_currency: default_base_currency(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("eu", "fxsnap", "fxsnap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(endpoint) = &self.store.endpoint {
            return Ok(PathBuf::from(endpoint));
        }
        let proj_dirs = ProjectDirs::from("eu", "fxsnap", "fxsnap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Applies `TABLE_NAME` and `STORE_ENDPOINT` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(env::var("TABLE_NAME").ok(), env::var("STORE_ENDPOINT").ok())
    }

    pub fn with_overrides(mut self, table_name: Option<String>, endpoint: Option<String>) -> Self {
        if let Some(table_name) = table_name.filter(|t| !t.is_empty()) {
            debug!(%table_name, "Overriding table name");
            self.store.table_name = table_name;
        }
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            debug!(%endpoint, "Overriding store endpoint");
            self.store.endpoint = Some(endpoint);
        }
        self
    }
}
