//! Routing of low-confidence input through cache, quota and inference.
//!
//! ```text
//! CHECK_CACHE ── hit ──────────────────────────────────────────► DONE_CACHED
//!      │ miss
//! CHECK_QUOTA ── exhausted ────────────────────────────────────► FAIL_QUOTA
//!      │ ok
//! PROBE_LOCAL ── unavailable ─┐
//!      │ available            │
//! CALL_LOCAL ─── failure ─────┤
//!      │ success              ▼
//!      │                 CALL_REMOTE ── failure ───────────────► FAIL_REMOTE
//!      │                      │ success
//!      └──────────────► WRITE_RESULT ──────────────────────────► DONE
//! ```
//!
//! Quota is charged immediately before the remote call. A charge refused at
//! that point (another caller took the last one) ends in `FAIL_QUOTA`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::monitor::CallMonitor;
use crate::providers::{LocalInference, RemoteInference};
use crate::quota::QuotaLedger;
use crate::telemetry;
use crate::types::{Method, ParsedTerms, PromptResult};
use crate::{Result, ShotTermsError};

/// Composes cache, quota ledger, call monitor and inference backends.
pub struct Orchestrator {
    cache: Arc<ResultCache>,
    quota: Arc<QuotaLedger>,
    monitor: Arc<CallMonitor>,
    remote: Arc<dyn RemoteInference>,
    local: Option<Arc<dyn LocalInference>>,
    remote_timeout: Duration,
    local_timeout: Duration,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        cache: Arc<ResultCache>,
        quota: Arc<QuotaLedger>,
        monitor: Arc<CallMonitor>,
        remote: Arc<dyn RemoteInference>,
        local: Option<Arc<dyn LocalInference>>,
        remote_timeout: Duration,
        local_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            quota,
            monitor,
            remote,
            local,
            remote_timeout,
            local_timeout,
        }
    }

    /// Resolve `text` through the routing state machine.
    pub async fn route(&self, text: &str) -> Result<PromptResult> {
        let started = Instant::now();

        if let Some(terms) = self.cache.get(text).await {
            self.monitor
                .record(text, true, elapsed_ms(started), true, None)
                .await;
            return Ok(PromptResult::new(terms, Method::Remote, true));
        }

        if !self.quota.has_quota().await {
            info!("remote quota exhausted, not calling inference");
            return Err(self.quota_exhausted().await);
        }

        let terms = match self.try_local(text).await {
            Some(terms) => terms,
            None => {
                if !self.quota.try_charge().await {
                    info!("quota charge refused before remote call");
                    return Err(self.quota_exhausted().await);
                }
                match self.call_remote(text).await {
                    Ok(terms) => terms,
                    Err(e) => {
                        warn!(error = %e, backend = self.remote.name(), "remote inference failed");
                        self.monitor
                            .record(text, false, elapsed_ms(started), false, Some(e.to_string()))
                            .await;
                        return Err(e);
                    }
                }
            }
        };

        self.cache.put(text, terms.clone()).await;
        self.monitor
            .record(text, true, elapsed_ms(started), false, None)
            .await;
        Ok(PromptResult::new(terms, Method::Remote, false))
    }

    /// Probe and call the local backend. `None` routes to remote.
    async fn try_local(&self, text: &str) -> Option<ParsedTerms> {
        let local = self.local.as_ref()?;

        let available = tokio::time::timeout(self.local_timeout, local.probe())
            .await
            .unwrap_or(false);
        if !available {
            debug!(backend = local.name(), "local inference unavailable");
            return None;
        }

        match timed("local", self.local_timeout, local.parse(text)).await {
            Ok(terms) => Some(terms),
            Err(e) => {
                debug!(error = %e, backend = local.name(), "local inference failed, falling back to remote");
                None
            }
        }
    }

    async fn call_remote(&self, text: &str) -> Result<ParsedTerms> {
        timed("remote", self.remote_timeout, self.remote.parse(text)).await
    }

    async fn quota_exhausted(&self) -> ShotTermsError {
        ShotTermsError::QuotaExhausted {
            remaining: self.quota.remaining().await,
            limit: self.quota.limit(),
        }
    }
}

/// Run one inference call under `limit`, recording call metrics.
///
/// An elapsed timeout is a `ServiceUnavailable` failure.
async fn timed<F>(backend: &'static str, limit: Duration, call: F) -> Result<ParsedTerms>
where
    F: Future<Output = Result<ParsedTerms>>,
{
    let started = Instant::now();
    let result = match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ShotTermsError::ServiceUnavailable(format!(
            "{backend} inference timed out after {}ms",
            limit.as_millis()
        ))),
    };

    metrics::histogram!(telemetry::INFERENCE_DURATION_SECONDS, "backend" => backend)
        .record(started.elapsed().as_secs_f64());
    let status = if result.is_ok() { "ok" } else { "error" };
    metrics::counter!(telemetry::INFERENCE_CALLS_TOTAL, "backend" => backend, "status" => status)
        .increment(1);
    result
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
