//! Persistent result cache for remote parses.
//!
//! [`ResultCache`] remembers what the inference service answered for a given
//! input so repeated descriptions cost no quota. The whole collection is one
//! JSON document in the injected [`KvStore`] under [`CACHE_KEY`].
//!
//! # Keys
//!
//! The key is the input text, trimmed and case-folded. It is a
//! normalization, not a hash: `" Medium Shot "` and `"medium shot"` share an
//! entry.
//!
//! # Expiry and eviction
//!
//! Entries older than the TTL are logically gone. Every `get` and `put`
//! sweeps them out of the stored document. `put` additionally evicts the
//! oldest entries (by `created_at`) so the collection never exceeds
//! `max_entries`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::clock::Clock;
use crate::store::{self, CACHE_KEY, KvStore};
use crate::telemetry;
use crate::types::ParsedTerms;

const COMPONENT: &str = "cache";

/// Configuration for the result cache.
///
/// ```rust
/// # use shotterms::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(50)
///     .ttl(Duration::from_secs(24 * 3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 100.
    pub max_entries: usize,
    /// Time-to-live for cached entries. Default: 7 days.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// A cached parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub terms: ParsedTerms,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Live (unexpired) entries.
    pub size: usize,
    pub max_size: usize,
    /// TTL in seconds.
    pub max_age_secs: u64,
    /// `created_at` of the oldest live entry.
    pub oldest_timestamp: Option<DateTime<Utc>>,
}

type Entries = BTreeMap<String, CacheEntry>;

/// Content-keyed cache of prior parses with TTL and capacity eviction.
pub struct ResultCache {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    // serializes load-modify-save of the collection document
    lock: Mutex<()>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: CacheConfig) -> Self {
        Self {
            store,
            clock,
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a prior parse for `text`.
    ///
    /// Sweeps expired entries from the store as a side effect. Returns `None`
    /// on miss, on expiry, and when the store cannot be read.
    pub async fn get(&self, text: &str) -> Option<ParsedTerms> {
        let key = cache_key(text);
        let _guard = self.lock.lock().await;

        let mut entries = self.load().await;
        if self.sweep_expired(&mut entries) > 0 {
            self.save(&entries).await;
        }

        match entries.remove(&key) {
            Some(entry) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                debug!(key = %key, "result cache hit");
                Some(entry.terms)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Store `terms` as the parse for `text`, stamped with the current time.
    ///
    /// Overwrites any previous entry for the same key. A failed write is
    /// logged and dropped.
    pub async fn put(&self, text: &str, terms: ParsedTerms) {
        if self.config.max_entries == 0 {
            return;
        }
        let key = cache_key(text);
        let _guard = self.lock.lock().await;

        let mut entries = self.load().await;
        self.sweep_expired(&mut entries);
        entries.remove(&key);

        while entries.len() >= self.config.max_entries {
            let Some(oldest) = oldest_key(&entries) else {
                break;
            };
            debug!(key = %oldest, "evicting oldest cache entry");
            entries.remove(&oldest);
        }

        entries.insert(
            key,
            CacheEntry {
                terms,
                created_at: self.clock.now(),
            },
        );
        self.save(&entries).await;
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let _guard = self.lock.lock().await;
        store::remove_key(self.store.as_ref(), CACHE_KEY, COMPONENT).await;
    }

    /// Occupancy snapshot. Does not write to the store.
    pub async fn stats(&self) -> CacheStats {
        let mut entries = self.load().await;
        self.sweep_expired(&mut entries);
        CacheStats {
            size: entries.len(),
            max_size: self.config.max_entries,
            max_age_secs: self.config.ttl.as_secs(),
            oldest_timestamp: entries.values().map(|e| e.created_at).min(),
        }
    }

    async fn load(&self) -> Entries {
        store::load_json(self.store.as_ref(), CACHE_KEY, COMPONENT)
            .await
            .unwrap_or_default()
    }

    async fn save(&self, entries: &Entries) {
        store::save_json(self.store.as_ref(), CACHE_KEY, entries, COMPONENT).await;
    }

    /// Remove entries older than the TTL. Returns how many were removed.
    fn sweep_expired(&self, entries: &mut Entries) -> usize {
        let now = self.clock.now();
        let ttl = TimeDelta::from_std(self.config.ttl).unwrap_or(TimeDelta::MAX);
        let before = entries.len();
        entries.retain(|_, e| now.signed_duration_since(e.created_at) <= ttl);
        before - entries.len()
    }
}

/// Normalize input text into a cache key: trimmed and case-folded.
pub fn cache_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Key of the entry with the smallest `created_at` (ties broken by key).
fn oldest_key(entries: &Entries) -> Option<String> {
    entries
        .iter()
        .min_by(|a, b| a.1.created_at.cmp(&b.1.created_at).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.clone())
}
