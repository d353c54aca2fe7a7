// CLI module for issi-swcache
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// issi-swcache - service worker caching policy hosted as a caching proxy
#[derive(Parser, Debug, Default)]
#[command(name = "issi-swcache", version, about, long_about = None)]
pub struct Args {
    /// Config file (defaults to ~/.issi-swcache/config.toml when present)
    #[arg(short, long, env = "ISSI_SWCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Origin base URL to fetch from
    #[arg(long)]
    pub origin: Option<String>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Partition version tag (bumping it purges old partitions on activation)
    #[arg(long)]
    pub cache_version: Option<String>,
}

impl Args {
    /// Apply flags on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(origin) = &self.origin {
            config.origin.base_url = origin.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(version) = &self.cache_version {
            config.cache.version = version.clone();
        }
    }
}
