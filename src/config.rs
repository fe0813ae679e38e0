//! Configuration loading for the `shotterms` binary.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.shotterms/config.toml` (user)
//! 3. `/etc/shotterms/config.toml` (system)
//!
//! Without any config file the built-in defaults apply.
//!
//! The service credential is loaded separately with mandatory permission checks:
//! 1. `~/.shotterms/secrets.toml` (user, must be 0600)
//! 2. `/etc/shotterms/secrets.toml` (system, must be 0600)
//! 3. the `SHOTTERMS_API_KEY` environment variable

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gateway::{DEFAULT_LOCAL_THRESHOLD, ShotTermsBuilder};
use crate::providers::{LocalConfig, RemoteConfig};
use crate::{CacheConfig, MonitorConfig, QuotaConfig, Result, ShotTermsError};

/// Environment variable holding the service credential.
pub const CREDENTIAL_ENV_VAR: &str = "SHOTTERMS_API_KEY";

/// File-based configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory for persisted state (default: platform data dir).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Dictionary-match confidence at or above which inference is skipped.
    #[serde(default = "default_local_threshold")]
    pub local_threshold: f64,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub quota: QuotaSection,
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub remote: RemoteSection,
    #[serde(default)]
    pub local: LocalSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            local_threshold: default_local_threshold(),
            cache: CacheSection::default(),
            quota: QuotaSection::default(),
            monitor: MonitorSection::default(),
            remote: RemoteSection::default(),
            local: LocalSection::default(),
        }
    }
}

fn default_local_threshold() -> f64 {
    DEFAULT_LOCAL_THRESHOLD
}

/// Result cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Maximum entries (default: 100).
    #[serde(default = "default_cache_entries")]
    pub max_entries: usize,
    /// Entry lifetime in seconds (default: 7 days).
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_cache_entries(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_entries() -> usize {
    CacheConfig::default().max_entries
}

fn default_cache_ttl() -> u64 {
    CacheConfig::default().ttl.as_secs()
}

/// Quota settings.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaSection {
    /// Remote calls per day (default: 10).
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
}

impl Default for QuotaSection {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
        }
    }
}

fn default_daily_limit() -> u32 {
    QuotaConfig::default().daily_limit
}

/// Call monitor settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    /// Records kept (default: 1000).
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// Price of one remote call (default: 0.002).
    #[serde(default = "default_cost_per_call")]
    pub cost_per_call: f64,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            cost_per_call: default_cost_per_call(),
        }
    }
}

fn default_max_records() -> usize {
    MonitorConfig::default().max_records
}

fn default_cost_per_call() -> f64 {
    MonitorConfig::default().cost_per_call
}

/// Remote inference service settings. The credential lives in secrets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteSection {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Local inference settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalSection {
    /// Probe the local server before calling remote (default: true).
    #[serde(default = "default_local_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub probe_timeout_ms: Option<u64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for LocalSection {
    fn default() -> Self {
        Self {
            enabled: default_local_enabled(),
            base_url: None,
            probe_timeout_ms: None,
            timeout_secs: None,
        }
    }
}

fn default_local_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, a missing user and system
    /// config yields the defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ShotTermsError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ShotTermsError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ShotTermsError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".shotterms").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/shotterms/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply these settings to a gateway builder.
    pub fn apply(&self, mut builder: ShotTermsBuilder) -> ShotTermsBuilder {
        if let Some(dir) = &self.data_dir {
            builder = builder.data_dir(dir.clone());
        }

        let mut remote = RemoteConfig::new();
        if let Some(url) = &self.remote.base_url {
            remote = remote.base_url(url.clone());
        }
        if let Some(model) = &self.remote.model {
            remote = remote.model(model.clone());
        }
        if let Some(secs) = self.remote.timeout_secs {
            remote = remote.timeout(Duration::from_secs(secs));
        }

        let mut local = LocalConfig::new();
        if let Some(url) = &self.local.base_url {
            local = local.base_url(url.clone());
        }
        if let Some(ms) = self.local.probe_timeout_ms {
            local = local.probe_timeout(Duration::from_millis(ms));
        }
        if let Some(secs) = self.local.timeout_secs {
            local = local.timeout(Duration::from_secs(secs));
        }

        builder = builder
            .local_threshold(self.local_threshold)
            .cache_config(
                CacheConfig::new()
                    .max_entries(self.cache.max_entries)
                    .ttl(Duration::from_secs(self.cache.ttl_secs)),
            )
            .quota_config(QuotaConfig::new().daily_limit(self.quota.daily_limit))
            .monitor_config(
                MonitorConfig::new()
                    .max_records(self.monitor.max_records)
                    .cost_per_call(self.monitor.cost_per_call),
            )
            .remote_config(remote)
            .local_config(local);

        if !self.local.enabled {
            builder = builder.without_local();
        }
        builder
    }
}

/// Secrets configuration (service credential).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub remote: Option<RemoteSecret>,
}

/// Credential of the remote inference service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSecret {
    pub service_credential: String,
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (the credential may come from
    /// the environment).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".shotterms").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/shotterms/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load one secrets file, rejecting insecure permissions.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            ShotTermsError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ShotTermsError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            ShotTermsError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(ShotTermsError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// The service credential, falling back to `SHOTTERMS_API_KEY`.
    pub fn service_credential(&self) -> Option<String> {
        self.remote
            .as_ref()
            .map(|s| s.service_credential.clone())
            .or_else(|| std::env::var(CREDENTIAL_ENV_VAR).ok())
            .filter(|c| !c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.local_threshold, 0.7);
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.cache.ttl_secs, 604_800);
        assert_eq!(config.quota.daily_limit, 10);
        assert_eq!(config.monitor.max_records, 1000);
        assert!(config.local.enabled);
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [quota]
            daily_limit = 25
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.quota.daily_limit, 25);
        // Defaults preserved
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.local_threshold, 0.7);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            data_dir = "/var/lib/shotterms"
            local_threshold = 0.8

            [cache]
            max_entries = 50
            ttl_secs = 3600

            [monitor]
            max_records = 200
            cost_per_call = 0.01

            [remote]
            base_url = "https://inference.example.com/v1"
            model = "shot-parser"
            timeout_secs = 20

            [local]
            enabled = false
            base_url = "http://127.0.0.1:11434"
            probe_timeout_ms = 500
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/shotterms")));
        assert_eq!(config.local_threshold, 0.8);
        assert_eq!(config.cache.max_entries, 50);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.monitor.max_records, 200);
        assert_eq!(config.remote.model.as_deref(), Some("shot-parser"));
        assert_eq!(config.remote.timeout_secs, Some(20));
        assert!(!config.local.enabled);
        assert_eq!(config.local.probe_timeout_ms, Some(500));
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [remote]
            service_credential = "sk-test-key"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(
            secrets.remote.as_ref().unwrap().service_credential,
            "sk-test-key"
        );
        assert_eq!(secrets.service_credential(), Some("sk-test-key".to_string()));
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}
