//! TermGateway - the `optimize` entry point and admin operations

use std::sync::Arc;

use tracing::debug;

use super::orchestrator::Orchestrator;
use crate::cache::{CacheStats, ResultCache};
use crate::matcher::{MatchOutcome, TermMatcher};
use crate::monitor::{CallMonitor, CallRecord, CallStats};
use crate::quota::{QuotaLedger, QuotaStats};
use crate::telemetry;
use crate::types::{Method, OptimizeInput, PromptResult};
use crate::{Result, ShotTermsError};

/// Normalizes shot descriptions into controlled camera terms.
///
/// Built with [`ShotTerms::builder()`](super::ShotTerms::builder).
pub struct TermGateway {
    matcher: TermMatcher,
    orchestrator: Orchestrator,
    cache: Arc<ResultCache>,
    quota: Arc<QuotaLedger>,
    monitor: Arc<CallMonitor>,
    local_threshold: f64,
}

impl TermGateway {
    pub(crate) fn new(
        orchestrator: Orchestrator,
        cache: Arc<ResultCache>,
        quota: Arc<QuotaLedger>,
        monitor: Arc<CallMonitor>,
        local_threshold: f64,
    ) -> Self {
        Self {
            matcher: TermMatcher::new(),
            orchestrator,
            cache,
            quota,
            monitor,
            local_threshold,
        }
    }

    /// Turn form fields or free text into normalized terms.
    ///
    /// Form input is trusted as-is. Free text is matched against the synonym
    /// tables first; only when the match confidence is below the local
    /// threshold is it routed through cache, quota and inference.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for blank free text
    /// - `QuotaExhausted` when no remote call may be made today
    /// - `ServiceUnavailable` / `MalformedResponse` when the remote call fails
    pub async fn optimize(&self, input: impl Into<OptimizeInput>) -> Result<PromptResult> {
        let result = match input.into() {
            OptimizeInput::Form(fields) => Ok(PromptResult::new(
                fields.into_terms(),
                Method::Form,
                false,
            )),
            OptimizeInput::FreeText(text) => self.optimize_text(&text).await,
        };

        let method = match &result {
            Ok(r) => r.method.as_str(),
            Err(_) => Method::Remote.as_str(),
        };
        metrics::counter!(telemetry::REQUESTS_TOTAL, "method" => method).increment(1);
        result
    }

    async fn optimize_text(&self, text: &str) -> Result<PromptResult> {
        if text.trim().is_empty() {
            return Err(ShotTermsError::InvalidInput(
                "shot description is empty".to_string(),
            ));
        }

        let outcome = self.matcher.match_text(text);
        if outcome.terms.confidence >= self.local_threshold {
            debug!(
                matched = outcome.matched_tokens,
                total = outcome.total_tokens,
                "dictionary match is confident"
            );
            return Ok(PromptResult::new(outcome.terms, Method::Local, false));
        }

        debug!(
            confidence = outcome.terms.confidence,
            complex = outcome.is_complex,
            "routing to inference"
        );
        self.orchestrator.route(text).await
    }

    /// Dictionary match only, no routing.
    pub fn match_text(&self, text: &str) -> MatchOutcome {
        self.matcher.match_text(text)
    }

    pub fn local_threshold(&self) -> f64 {
        self.local_threshold
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await
    }

    pub async fn quota_stats(&self) -> QuotaStats {
        self.quota.stats().await
    }

    pub async fn reset_quota(&self) {
        self.quota.reset().await
    }

    /// Call statistics over the last `window_days` days.
    pub async fn stats(&self, window_days: u32) -> CallStats {
        self.monitor.stats_window(window_days).await
    }

    /// Call statistics for the current calendar day.
    pub async fn today_stats(&self) -> CallStats {
        self.monitor.stats_today().await
    }

    pub async fn clear_monitor(&self) {
        self.monitor.clear().await
    }

    /// Up to `limit` most recent call records, newest first.
    pub async fn recent_calls(&self, limit: usize) -> Vec<CallRecord> {
        self.monitor.recent(limit).await
    }
}
