//! Configuration integration tests
//!
//! These tests cover loading configuration from JSON files and environment
//! variables, and the priority merge between sources.

use std::env;
use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use tunnel_relay::config::{RelayConfig, ENV_PREFIX};

fn write_config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Should create a temporary file");
    file.write_all(content.as_bytes()).expect("Should write the configuration");
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config_file(
        r#"{
            "listen": "127.0.0.1:20347",
            "routes": { "enjoys": "127.0.0.1:6380" },
            "buffer_size": 16384,
            "idle_timeout_secs": 60
        }"#,
    );

    let config = RelayConfig::from_file(file.path()).expect("Should load a valid config file");
    assert_eq!(config.listen.port(), 20347);
    assert_eq!(config.routes.get("enjoys").map(|a| a.port()), Some(6380));
    assert_eq!(config.buffer_size, 16384);
    assert_eq!(config.idle_timeout_secs, 60);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_from_missing_file() {
    assert!(RelayConfig::from_file("does-not-exist.json").is_err());
}

#[test]
fn test_unknown_fields_rejected() {
    let file = write_config_file(r#"{ "listen": "127.0.0.1:20347", "tls_cert": "x.pem" }"#);
    assert!(RelayConfig::from_file(file.path()).is_err(), "Unknown fields should be rejected");
}

#[test]
fn test_malformed_json_rejected() {
    let file = write_config_file("{ not json");
    assert!(RelayConfig::from_file(file.path()).is_err());
}

#[test]
fn test_file_then_flags_priority() {
    let file = write_config_file(
        r#"{
            "routes": { "enjoys": "127.0.0.1:6380" },
            "buffer_size": 16384
        }"#,
    );

    let base = RelayConfig::default().merge(RelayConfig::from_file(file.path()).unwrap());

    // Flag overlay changes only the idle timeout
    let flags = RelayConfig::from_args("0.0.0.0:20347", &[], 8192, 10, 30, "info").unwrap();
    let merged = base.merge(flags);

    // Flag value wins where set, file values survive elsewhere
    assert_eq!(merged.idle_timeout_secs, 30);
    assert_eq!(merged.buffer_size, 16384);
    assert_eq!(merged.routes.len(), 1);
}

#[test]
#[serial]
fn test_load_from_env() {
    env::set_var(format!("{}LISTEN", ENV_PREFIX), "127.0.0.1:19999");
    env::set_var(
        format!("{}ROUTES", ENV_PREFIX),
        "enjoys=127.0.0.1:6380,other=127.0.0.1:6381",
    );
    env::set_var(format!("{}IDLE_TIMEOUT", ENV_PREFIX), "0");

    let config = RelayConfig::from_env().expect("Should load configuration from environment");

    env::remove_var(format!("{}LISTEN", ENV_PREFIX));
    env::remove_var(format!("{}ROUTES", ENV_PREFIX));
    env::remove_var(format!("{}IDLE_TIMEOUT", ENV_PREFIX));

    assert_eq!(config.listen.port(), 19999);
    assert_eq!(config.routes.len(), 2);
    assert_eq!(config.routes.get("other").map(|a| a.port()), Some(6381));
    assert!(config.idle_timeout().is_none(), "Zero idle timeout should disable it");
}

#[test]
#[serial]
fn test_env_rejects_bad_values() {
    env::set_var(format!("{}BUFFER_SIZE", ENV_PREFIX), "lots");
    let result = RelayConfig::from_env();
    env::remove_var(format!("{}BUFFER_SIZE", ENV_PREFIX));
    assert!(result.is_err(), "Non-numeric buffer size should be rejected");
}

#[test]
#[serial]
fn test_env_unset_leaves_defaults() {
    for name in ["LISTEN", "ROUTES", "TARGET", "BUFFER_SIZE", "CONNECT_TIMEOUT", "IDLE_TIMEOUT", "LOG_LEVEL"] {
        env::remove_var(format!("{}{}", ENV_PREFIX, name));
    }

    let config = RelayConfig::from_env().expect("Should fall back to defaults");
    let defaults = RelayConfig::default();
    assert_eq!(config.listen, defaults.listen);
    assert!(config.routes.is_empty());
    assert_eq!(config.buffer_size, defaults.buffer_size);
}
