use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::language::DEFAULT_LANGUAGE_SIGNAL_KEY;
use crate::store::{ConfigurationStore, JsonFileConfigurationStore};
use crate::Result;
use murfai_provider::{MurfClient, DEFAULT_SYNTHESIS_URL, MURF_API_BASE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MurfSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Endpoint URL offered as the default on the options step.
    #[serde(default = "default_synthesis_url")]
    pub synthesis_url: String,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default = "default_language_signal_key")]
    pub language_signal_key: String,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Pre-fills the API key step. Never required.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_api_base() -> String {
    MURF_API_BASE.to_string()
}

fn default_synthesis_url() -> String {
    DEFAULT_SYNTHESIS_URL.to_string()
}

fn default_language_signal_key() -> String {
    DEFAULT_LANGUAGE_SIGNAL_KEY.to_string()
}

impl Default for MurfSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            synthesis_url: default_synthesis_url(),
            timeout_seconds: None,
            language_signal_key: default_language_signal_key(),
            store_path: None,
            api_key: None,
        }
    }
}

impl MurfSettings {
    pub fn new() -> std::result::Result<Self, ConfigError> {
        let mut config = Config::builder();

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("murfai").join("config");
            for ext in &["toml", "json", "yaml", "yml"] {
                let file_path = config_path.with_extension(ext);
                if file_path.exists() {
                    config = config.add_source(File::from(file_path));
                }
            }
        }

        for filename in &[".murfai", "murfai"] {
            for ext in &["toml", "json", "yaml", "yml"] {
                let file_path = PathBuf::from(format!("{}.{}", filename, ext));
                if file_path.exists() {
                    config = config.add_source(File::from(file_path));
                }
            }
        }

        config = config.add_source(Environment::with_prefix("MURFAI").try_parsing(true));

        if let Ok(api_key) = env::var("MURF_API_KEY") {
            config = config.set_override("api_key", api_key)?;
        }

        config.build()?.try_deserialize()
    }

    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::new()
    }

    pub fn from_map(map: HashMap<String, serde_json::Value>) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(map.into_iter().collect()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Configured store location, else `<data_dir>/murfai/entries.json`.
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("murfai")
                .join("entries.json")
        })
    }

    pub fn open_store(&self) -> Arc<dyn ConfigurationStore> {
        Arc::new(JsonFileConfigurationStore::new(self.resolved_store_path()))
    }

    pub fn catalog_client(&self) -> Result<MurfClient> {
        let client = MurfClient::with_base_url(&self.api_base);
        match self.timeout() {
            Some(timeout) => client.with_timeout(timeout),
            None => Ok(client),
        }
    }
}
