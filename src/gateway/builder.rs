//! Builder for configuring gateway instances

use std::path::PathBuf;
use std::sync::Arc;

use super::TermGateway;
use super::orchestrator::Orchestrator;
use crate::cache::{CacheConfig, ResultCache};
use crate::clock::{Clock, SystemClock};
use crate::monitor::{CallMonitor, MonitorConfig};
use crate::providers::{
    LocalConfig, LocalInference, LocalProbe, RemoteClient, RemoteConfig, RemoteInference,
};
use crate::quota::{QuotaConfig, QuotaLedger};
use crate::store::{FileStore, KvStore};
use crate::{Result, ShotTermsError};

/// Dictionary-match confidence at or above which free text skips inference.
pub const DEFAULT_LOCAL_THRESHOLD: f64 = 0.7;

/// Main entry point for creating gateway instances.
pub struct ShotTerms;

impl ShotTerms {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> ShotTermsBuilder {
        ShotTermsBuilder::new()
    }
}

/// Builder for configuring gateway instances.
pub struct ShotTermsBuilder {
    store: Option<Arc<dyn KvStore>>,
    data_dir: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
    cache: CacheConfig,
    quota: QuotaConfig,
    monitor: MonitorConfig,
    remote: RemoteConfig,
    local: LocalConfig,
    local_enabled: bool,
    remote_backend: Option<Arc<dyn RemoteInference>>,
    local_backend: Option<Arc<dyn LocalInference>>,
    local_threshold: f64,
}

impl ShotTermsBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            data_dir: None,
            clock: None,
            cache: CacheConfig::default(),
            quota: QuotaConfig::default(),
            monitor: MonitorConfig::default(),
            remote: RemoteConfig::default(),
            local: LocalConfig::default(),
            local_enabled: true,
            remote_backend: None,
            local_backend: None,
            local_threshold: DEFAULT_LOCAL_THRESHOLD,
        }
    }

    /// Use an explicit durable store for cache, quota and monitor state.
    pub fn store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Persist state as files under `dir` (ignored when `store` is set).
    ///
    /// Defaults to the platform data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Override the time source (tests).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    pub fn quota_config(mut self, config: QuotaConfig) -> Self {
        self.quota = config;
        self
    }

    pub fn monitor_config(mut self, config: MonitorConfig) -> Self {
        self.monitor = config;
        self
    }

    /// Configure the stock remote client.
    pub fn remote_config(mut self, config: RemoteConfig) -> Self {
        self.remote = config;
        self
    }

    /// Set the bearer credential of the remote inference service.
    pub fn service_credential(mut self, credential: impl Into<String>) -> Self {
        self.remote.service_credential = Some(credential.into());
        self
    }

    /// Configure the stock local probe.
    pub fn local_config(mut self, config: LocalConfig) -> Self {
        self.local = config;
        self
    }

    /// Never probe or call a local backend.
    pub fn without_local(mut self) -> Self {
        self.local_enabled = false;
        self
    }

    /// Replace the stock remote client.
    pub fn remote_backend(mut self, backend: Arc<dyn RemoteInference>) -> Self {
        self.remote_backend = Some(backend);
        self
    }

    /// Replace the stock local probe.
    pub fn local_backend(mut self, backend: Arc<dyn LocalInference>) -> Self {
        self.local_backend = Some(backend);
        self.local_enabled = true;
        self
    }

    /// Dictionary-match confidence at or above which inference is skipped.
    pub fn local_threshold(mut self, threshold: f64) -> Self {
        self.local_threshold = threshold;
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<TermGateway> {
        if !(0.0..=1.0).contains(&self.local_threshold) {
            return Err(ShotTermsError::Configuration(format!(
                "local threshold must be within [0, 1], got {}",
                self.local_threshold
            )));
        }
        if self.remote_backend.is_none() && self.remote.base_url.trim().is_empty() {
            return Err(ShotTermsError::Configuration(
                "remote base URL is empty".to_string(),
            ));
        }

        let store: Arc<dyn KvStore> = match self.store {
            Some(store) => store,
            None => Arc::new(FileStore::new(
                self.data_dir.unwrap_or_else(FileStore::default_dir),
            )),
        };
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let cache = Arc::new(ResultCache::new(store.clone(), clock.clone(), self.cache));
        let quota = Arc::new(QuotaLedger::new(store.clone(), clock.clone(), self.quota));
        let monitor = Arc::new(CallMonitor::new(store, clock, self.monitor));

        let remote: Arc<dyn RemoteInference> = match self.remote_backend {
            Some(backend) => backend,
            None => Arc::new(RemoteClient::new(&self.remote)),
        };
        let local: Option<Arc<dyn LocalInference>> = if !self.local_enabled {
            None
        } else {
            Some(match self.local_backend {
                Some(backend) => backend,
                None => Arc::new(LocalProbe::new(&self.local)),
            })
        };

        let orchestrator = Orchestrator::new(
            cache.clone(),
            quota.clone(),
            monitor.clone(),
            remote,
            local,
            self.remote.timeout,
            self.local.timeout,
        );

        Ok(TermGateway::new(
            orchestrator,
            cache,
            quota,
            monitor,
            self.local_threshold,
        ))
    }
}

impl Default for ShotTermsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
