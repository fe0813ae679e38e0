//! Tests for file-based configuration and secrets loading.
#![cfg(feature = "cli")]

use std::io::Write;
use std::sync::Arc;

use shotterms::config::{Config, Secrets};
use shotterms::{MemoryStore, ShotTerms};

#[test]
fn load_explicit_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        local_threshold = 0.6

        [quota]
        daily_limit = 3

        [local]
        enabled = false
        "#
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.local_threshold, 0.6);
    assert_eq!(config.quota.daily_limit, 3);
    assert!(!config.local.enabled);
}

#[test]
fn malformed_config_is_a_configuration_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[quota\ndaily_limit = ").unwrap();

    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[tokio::test]
async fn applied_config_shapes_the_gateway() {
    let config: Config = toml::from_str(
        r#"
        local_threshold = 0.5

        [quota]
        daily_limit = 4

        [cache]
        max_entries = 7
        ttl_secs = 60
        "#,
    )
    .unwrap();

    let gateway = config
        .apply(ShotTerms::builder())
        .store(Arc::new(MemoryStore::new()))
        .build()
        .unwrap();

    assert_eq!(gateway.local_threshold(), 0.5);
    assert_eq!(gateway.quota_stats().await.limit, 4);
    let cache = gateway.cache_stats().await;
    assert_eq!(cache.max_size, 7);
    assert_eq!(cache.max_age_secs, 60);
}

#[cfg(unix)]
#[test]
fn secrets_require_private_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("secrets.toml");
    std::fs::write(
        &path,
        "[remote]\nservice_credential = \"sk-from-file\"\n",
    )
    .unwrap();

    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    let err = Secrets::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("insecure permissions"));

    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();
    let secrets = Secrets::load_from(&path).unwrap();
    assert_eq!(
        secrets.service_credential().as_deref(),
        Some("sk-from-file")
    );
}
