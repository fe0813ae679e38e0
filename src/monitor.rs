//! Append-only log of inference outcomes with read-side aggregation.
//!
//! The monitor never influences routing. It exists so operators can see how
//! often results come from the cache, how long calls take and roughly what
//! the remote service costs.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::clock::{Clock, local_date};
use crate::store::{self, KvStore, MONITOR_KEY};

const COMPONENT: &str = "monitor";

/// Configuration for the call monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Records kept; older ones are dropped first. Default: 1,000.
    pub max_records: usize,
    /// Price of one billable remote call. Default: 0.002.
    pub cost_per_call: f64,
    /// Input text is stored truncated to this many characters. Default: 100.
    pub input_preview_chars: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_records: 1_000,
            cost_per_call: 0.002,
            input_preview_chars: 100,
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_records(mut self, n: usize) -> Self {
        self.max_records = n;
        self
    }

    pub fn cost_per_call(mut self, cost: f64) -> Self {
        self.cost_per_call = cost;
        self
    }

    pub fn input_preview_chars(mut self, n: usize) -> Self {
        self.input_preview_chars = n;
        self
    }
}

/// One logged outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub timestamp: DateTime<Utc>,
    /// Input text, truncated to the configured preview length.
    pub input: String,
    pub success: bool,
    pub duration_ms: u64,
    /// Served from the result cache.
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub cached_count: usize,
    /// Successful calls that were not served from cache.
    pub api_call_count: usize,
    /// Percentage in `[0, 100]`.
    pub success_rate: f64,
    /// Percentage in `[0, 100]`.
    pub cache_hit_rate: f64,
    pub avg_duration_ms: f64,
    pub total_cost: f64,
}

impl CallStats {
    /// Aggregate `records`, pricing each billable call at `cost_per_call`.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a CallRecord>,
        cost_per_call: f64,
    ) -> Self {
        let mut stats = CallStats::default();
        let mut duration_sum: u64 = 0;
        for r in records {
            stats.total += 1;
            duration_sum = duration_sum.saturating_add(r.duration_ms);
            if r.success {
                stats.success_count += 1;
            } else {
                stats.failure_count += 1;
            }
            if r.cached {
                stats.cached_count += 1;
            }
            if r.success && !r.cached {
                stats.api_call_count += 1;
            }
        }
        if stats.total > 0 {
            let total = stats.total as f64;
            stats.success_rate = stats.success_count as f64 / total * 100.0;
            stats.cache_hit_rate = stats.cached_count as f64 / total * 100.0;
            stats.avg_duration_ms = duration_sum as f64 / total;
        }
        stats.total_cost = stats.api_call_count as f64 * cost_per_call;
        stats
    }
}

/// Bounded, persisted log of call outcomes.
pub struct CallMonitor {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    config: MonitorConfig,
    lock: Mutex<()>,
}

impl CallMonitor {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: MonitorConfig) -> Self {
        Self {
            store,
            clock,
            config,
            lock: Mutex::new(()),
        }
    }

    /// Append one outcome stamped with the current time.
    ///
    /// Keeps only the newest `max_records`. A failed write is logged and
    /// dropped.
    pub async fn record(
        &self,
        input: &str,
        success: bool,
        duration_ms: u64,
        cached: bool,
        error: Option<String>,
    ) {
        let record = CallRecord {
            timestamp: self.clock.now(),
            input: input.chars().take(self.config.input_preview_chars).collect(),
            success,
            duration_ms,
            cached,
            error,
        };

        let _guard = self.lock.lock().await;
        let mut records = self.load().await;
        records.push(record);
        if records.len() > self.config.max_records {
            let excess = records.len() - self.config.max_records;
            records.drain(..excess);
        }
        store::save_json(self.store.as_ref(), MONITOR_KEY, &records, COMPONENT).await;
    }

    /// Aggregate over the last `days` days (24h periods back from now).
    pub async fn stats_window(&self, days: u32) -> CallStats {
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(TimeDelta::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let records = self.load().await;
        CallStats::from_records(
            records.iter().filter(|r| r.timestamp >= cutoff),
            self.config.cost_per_call,
        )
    }

    /// Aggregate over records from the current calendar day.
    pub async fn stats_today(&self) -> CallStats {
        let today = self.clock.today();
        let records = self.load().await;
        CallStats::from_records(
            records.iter().filter(|r| local_date(r.timestamp) == today),
            self.config.cost_per_call,
        )
    }

    /// Up to `limit` most recent records, newest first.
    ///
    /// Each call returns a fresh snapshot.
    pub async fn recent(&self, limit: usize) -> Vec<CallRecord> {
        let records = self.load().await;
        records.into_iter().rev().take(limit).collect()
    }

    /// Drop every record.
    pub async fn clear(&self) {
        let _guard = self.lock.lock().await;
        store::remove_key(self.store.as_ref(), MONITOR_KEY, COMPONENT).await;
    }

    async fn load(&self) -> Vec<CallRecord> {
        store::load_json(self.store.as_ref(), MONITOR_KEY, COMPONENT)
            .await
            .unwrap_or_default()
    }
}
