// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{Result, WorkerError};
use config::{Config, Environment, File};
use reqwest::Url;
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. CLI arguments (highest, applied by the caller)
    /// 2. Environment variables (`ISSI_SWCACHE_CACHE__VERSION=v2`)
    /// 3. Config file
    /// 4. Defaults (lowest)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists; an explicit path must exist
            .add_source(File::from(file_path).required(path.is_some()))
            .add_source(
                Environment::with_prefix("ISSI_SWCACHE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cache.precache")
                    .with_list_parse_key("cache.api_prefixes")
                    .with_list_parse_key("cache.static_prefixes")
                    .with_list_parse_key("push.vibrate"),
            )
            .build()
            .map_err(|e| WorkerError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| WorkerError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the worker cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cache.version.trim().is_empty() {
            return Err(WorkerError::Config("cache.version must not be empty".into()));
        }

        if let Some(bad) = self
            .cache
            .precache
            .iter()
            .chain(self.cache.api_prefixes.iter())
            .chain(self.cache.static_prefixes.iter())
            .chain(std::iter::once(&self.cache.offline_path))
            .find(|p| !p.starts_with('/'))
        {
            return Err(WorkerError::Config(format!(
                "cache paths must be absolute, got {:?}",
                bad
            )));
        }

        let origin = &self.origin.base_url;
        let url = Url::parse(origin).map_err(|e| {
            WorkerError::Config(format!("origin.base_url {:?} is not a valid URL: {}", origin, e))
        })?;
        let has_host = url.host_str().is_some_and(|h| !h.is_empty());
        if !matches!(url.scheme(), "http" | "https") || !has_host {
            return Err(WorkerError::Config(format!(
                "origin.base_url must be an http(s) URL with a host, got {:?}",
                origin
            )));
        }

        Ok(())
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".issi-swcache")
            .join("config.toml")
    }
}
