use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::paths::{get_config_path, get_default_data_file};

/// Default port for the API server
pub const DEFAULT_API_PORT: u16 = 5001;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API root the client talks to
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_theme")]
    pub theme: String,

    /// Torah readings JSON served by `parsha serve`
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_api_url() -> String {
    format!("http://127.0.0.1:{DEFAULT_API_PORT}/api")
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_port() -> u16 {
    DEFAULT_API_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            theme: default_theme(),
            data_file: None,
            port: default_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn data_file(&self) -> Result<PathBuf> {
        match &self.data_file {
            Some(path) => Ok(path.clone()),
            None => get_default_data_file(),
        }
    }

    /// True when the client targets the server `parsha serve` would start locally.
    pub fn targets_local_server(&self) -> bool {
        let local = [
            format!("http://127.0.0.1:{}/api", self.port),
            format!("http://localhost:{}/api", self.port),
        ];
        let url = self.api_url.trim_end_matches('/');
        local.iter().any(|candidate| candidate == url)
    }
}
