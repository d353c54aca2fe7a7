//! Configuration data structures for the issi-swcache host.
//!
//! This module defines the schema for the application settings: the proxy
//! listener, the origin being fronted, the caching policy tables, and the
//! push/sync behaviour of the worker.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP listener settings (host, port).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream origin that the worker fetches from.
    #[serde(default)]
    pub origin: OriginConfig,

    /// Caching policy: partition version, precache manifest, API allow-list.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Push notification rendering.
    #[serde(default)]
    pub push: PushConfig,

    /// Background sync trigger settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body, in bytes.
    /// Default: `10 MiB` (application forms carry attachments)
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// Settings for the upstream origin connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginConfig {
    /// Base URL of the website origin, without trailing slash.
    /// Default: `http://127.0.0.1:3000`
    #[serde(default = "default_origin_url")]
    pub base_url: String,

    /// Optional whole-request timeout in seconds.
    /// Default: unset; the caching layer imposes no timeout of its own.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Settings for the caching policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Version tag embedded in every partition name (`static-<version>`).
    /// Bumping it invalidates every partition on the next activation.
    /// Default: `v1`
    #[serde(default = "default_cache_version")]
    pub version: String,

    /// Absolute paths fetched and stored at install time.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Path prefixes routed network-first through the api partition.
    #[serde(default = "default_api_prefixes")]
    pub api_prefixes: Vec<String>,

    /// Path prefixes always treated as static assets.
    #[serde(default = "default_static_prefixes")]
    pub static_prefixes: Vec<String>,

    /// Document served when neither network nor cache can answer.
    /// Default: `/` (the precached home page)
    #[serde(default = "default_offline_path")]
    pub offline_path: String,
}

/// Settings for push notification rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Icon shown on every notification.
    #[serde(default = "default_push_icon")]
    pub icon: String,

    /// Badge shown on every notification.
    #[serde(default = "default_push_badge")]
    pub badge: String,

    /// Vibration pattern in milliseconds.
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,

    /// Window URL used when the payload carries none.
    #[serde(default = "default_push_url")]
    pub default_url: String,
}

/// Settings for background sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Sync tag that triggers a sweep. Other tags are ignored.
    /// Default: `background-sync`
    #[serde(default = "default_sync_tag")]
    pub tag: String,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: default_origin_url(),
            timeout_seconds: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: default_cache_version(),
            precache: default_precache(),
            api_prefixes: default_api_prefixes(),
            static_prefixes: default_static_prefixes(),
            offline_path: default_offline_path(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            icon: default_push_icon(),
            badge: default_push_badge(),
            vibrate: default_vibrate(),
            default_url: default_push_url(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tag: default_sync_tag(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_origin_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_cache_version() -> String {
    "v1".to_string()
}

fn default_precache() -> Vec<String> {
    [
        "/",
        "/manifest.json",
        "/favicon.ico",
        "/robots.txt",
        "/sitemap.xml",
        "/icons/icon-192x192.png",
        "/icons/icon-512x512.png",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_api_prefixes() -> Vec<String> {
    vec!["/api/applications".to_string(), "/api/jobs".to_string()]
}

fn default_static_prefixes() -> Vec<String> {
    vec!["/_next/static/".to_string()]
}

fn default_offline_path() -> String {
    "/".to_string()
}

fn default_push_icon() -> String {
    "/icons/icon-192x192.png".to_string()
}

fn default_push_badge() -> String {
    "/icons/icon-72x72.png".to_string()
}

fn default_vibrate() -> Vec<u32> {
    vec![100, 50, 100]
}

fn default_push_url() -> String {
    "/".to_string()
}

fn default_sync_tag() -> String {
    "background-sync".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
