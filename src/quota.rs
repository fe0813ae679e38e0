//! Daily budget for remote inference calls.
//!
//! The ledger persists `{dateKey, used}` under [`QUOTA_KEY`]. A stored
//! record whose `dateKey` is not today counts as `used = 0`. That reset is
//! derived on every read, never scheduled, and read-only queries do not write
//! the fresh state back.
//!
//! [`QuotaLedger::try_charge`] is the only mutation on the hot path. It holds
//! the ledger lock across load, check and save, so concurrent callers can
//! never be granted more than `daily_limit` charges on one day.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::store::{self, KvStore, QUOTA_KEY};
use crate::telemetry;

const COMPONENT: &str = "quota";

/// Configuration for the quota ledger.
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// Remote calls allowed per calendar day. Default: 10.
    pub daily_limit: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { daily_limit: 10 }
    }
}

impl QuotaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of remote calls allowed per day.
    pub fn daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = limit;
        self
    }
}

/// Persisted quota record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaState {
    pub date_key: NaiveDate,
    pub used: u32,
}

/// Snapshot of today's quota usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStats {
    pub date_key: NaiveDate,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    /// `used / limit * 100`, 0 when the limit is 0.
    pub percentage: f64,
}

/// Daily call budget with derived date rollover.
pub struct QuotaLedger {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    config: QuotaConfig,
    lock: Mutex<()>,
}

impl QuotaLedger {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: QuotaConfig) -> Self {
        Self {
            store,
            clock,
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.config.daily_limit
    }

    /// Whether at least one charge is left today.
    pub async fn has_quota(&self) -> bool {
        self.remaining().await > 0
    }

    /// Charges left today.
    pub async fn remaining(&self) -> u32 {
        let state = self.effective_state().await;
        self.config.daily_limit.saturating_sub(state.used)
    }

    /// Atomically take one charge for today.
    ///
    /// Returns `false`, without mutating anything, when the limit is reached.
    /// A charge is refused as well when today's usage cannot be read or the
    /// new count cannot be persisted.
    pub async fn try_charge(&self) -> bool {
        let _guard = self.lock.lock().await;
        let today = self.clock.today();
        let stored: Option<QuotaState> =
            match store::try_load_json(self.store.as_ref(), QUOTA_KEY, COMPONENT).await {
                Ok(stored) => stored,
                Err(_) => {
                    metrics::counter!(telemetry::QUOTA_CHARGES_TOTAL, "outcome" => "refused")
                        .increment(1);
                    warn!("quota record could not be read, refusing charge");
                    return false;
                }
            };
        let state = current(stored, today);

        if state.used >= self.config.daily_limit {
            metrics::counter!(telemetry::QUOTA_CHARGES_TOTAL, "outcome" => "refused")
                .increment(1);
            info!(
                used = state.used,
                limit = self.config.daily_limit,
                "daily quota exhausted"
            );
            return false;
        }

        let next = QuotaState {
            date_key: state.date_key,
            used: state.used + 1,
        };
        if !store::save_json(self.store.as_ref(), QUOTA_KEY, &next, COMPONENT).await {
            metrics::counter!(telemetry::QUOTA_CHARGES_TOTAL, "outcome" => "refused")
                .increment(1);
            warn!("quota charge could not be persisted, refusing it");
            return false;
        }

        metrics::counter!(telemetry::QUOTA_CHARGES_TOTAL, "outcome" => "granted").increment(1);
        true
    }

    /// Forget all usage. Intended for tests and admin tooling.
    pub async fn reset(&self) {
        let _guard = self.lock.lock().await;
        store::remove_key(self.store.as_ref(), QUOTA_KEY, COMPONENT).await;
    }

    /// Today's usage snapshot.
    pub async fn stats(&self) -> QuotaStats {
        let state = self.effective_state().await;
        let limit = self.config.daily_limit;
        let percentage = if limit == 0 {
            0.0
        } else {
            f64::from(state.used) / f64::from(limit) * 100.0
        };
        QuotaStats {
            date_key: state.date_key,
            used: state.used,
            limit,
            remaining: limit.saturating_sub(state.used),
            percentage,
        }
    }

    /// Stored state as it applies today: another day's record reads as unused.
    async fn effective_state(&self) -> QuotaState {
        let today = self.clock.today();
        let stored: Option<QuotaState> =
            store::load_json(self.store.as_ref(), QUOTA_KEY, COMPONENT).await;
        current(stored, today)
    }
}

fn current(stored: Option<QuotaState>, today: NaiveDate) -> QuotaState {
    match stored {
        Some(state) if state.date_key == today => state,
        _ => QuotaState {
            date_key: today,
            used: 0,
        },
    }
}
