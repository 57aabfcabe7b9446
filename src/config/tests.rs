use super::settings::Settings;
use super::{PartialSettings, load_config_from};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 2000);
    assert_eq!(settings.server.max_frame_bytes, 1024);
    assert_eq!(settings.store.buckets, 1000);
    assert_eq!(settings.client.address, "127.0.0.1");
    assert_eq!(settings.client.max_connections, 100);
    assert_eq!(settings.ticker.key, "testKey");
    assert_eq!(settings.ticker.interval_ms, 1000);
    assert_eq!(settings.bench.clients, 200);
}

#[test]
fn test_empty_partial_merges_to_defaults() {
    let merged = PartialSettings::default().merge(Settings::default());
    assert_eq!(merged, Settings::default());
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("absent");
    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg, Settings::default());
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("jack.toml");
    let toml = r#"
        [server]
        host = "127.0.0.1"
        port = 9000

        [store]
        buckets = 16

        [ticker]
        key = "clock"
    "#;
    fs::write(&path, toml).expect("write config file");

    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.max_connections, 1024);
    assert_eq!(cfg.store.buckets, 16);
    assert_eq!(cfg.ticker.key, "clock");
    assert_eq!(cfg.ticker.interval_ms, 1000);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("jack.toml");
    fs::write(&path, "[server]\nport = 9000\n").expect("write config file");

    temp_env::with_vars(
        [
            ("JACK__SERVER__PORT", Some("9100")),
            ("JACK__CLIENT__MAX_CONNECTIONS", Some("7")),
        ],
        || {
            let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
            assert_eq!(cfg.server.port, 9100);
            assert_eq!(cfg.client.max_connections, 7);
        },
    );
}
