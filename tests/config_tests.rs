// Configuration loading tests
// Author: kelexine (https://github.com/kelexine)

use issi_swcache::config::AppConfig;
use issi_swcache::error::WorkerError;
use std::io::Write;

#[test]
fn test_config_defaults() {
    let config = AppConfig::default();

    assert_eq!(config.cache.version, "v1");
    assert_eq!(config.cache.api_prefixes, vec!["/api/applications", "/api/jobs"]);
    assert_eq!(config.cache.offline_path, "/");
    assert!(config.cache.precache.contains(&"/sitemap.xml".to_string()));
    assert_eq!(config.sync.tag, "background-sync");
    assert_eq!(config.push.vibrate, vec![100, 50, 100]);
    assert!(config.origin.timeout_seconds.is_none());
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[origin]
base_url = "https://issi.example"

[cache]
version = "v9"
api_prefixes = ["/api/jobs"]
"#
    )
    .unwrap();

    let config = AppConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.origin.base_url, "https://issi.example");
    assert_eq!(config.cache.version, "v9");
    assert_eq!(config.cache.api_prefixes, vec!["/api/jobs"]);
    // Untouched sections keep their defaults
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.cache.offline_path, "/");
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(AppConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_invalid_file_values_rejected() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[cache]\nversion = \"\"").unwrap();

    assert!(AppConfig::load(Some(file.path())).is_err());
}

#[test]
fn test_malformed_origin_rejected() {
    for origin in ["http://", "https://exa mple.com", "http://:99999", "not a url", "file:///srv/site"] {
        let mut config = AppConfig::default();
        config.origin.base_url = origin.to_string();
        assert!(
            matches!(config.validate(), Err(WorkerError::Config(_))),
            "{} should be rejected",
            origin
        );
    }
}

#[test]
fn test_origin_with_port_and_path_accepted() {
    let mut config = AppConfig::default();
    config.origin.base_url = "http://127.0.0.1:3000/site/".to_string();
    assert!(config.validate().is_ok());
}
