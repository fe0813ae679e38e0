//! Durable key-value storage for process-wide state.
//!
//! The result cache, quota ledger and call monitor each persist one JSON
//! document under a fixed key. They receive a shared [`KvStore`] handle at
//! construction, so tests can swap in [`MemoryStore`] and deployments can use
//! [`FileStore`].
//!
//! Store failures are never fatal to callers of the components: the
//! [`load_json`] / [`save_json`] helpers log a warning, count the fault and
//! degrade to "no state".

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::telemetry;
use crate::{Result, ShotTermsError};

/// Key of the result cache collection.
pub const CACHE_KEY: &str = "shotterms.cache";
/// Key of the quota record.
pub const QUOTA_KEY: &str = "shotterms.quota";
/// Key of the call monitor log.
pub const MONITOR_KEY: &str = "shotterms.monitor";

/// A string-valued durable key-value store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Store name for logging/debugging.
    fn name(&self) -> &str;

    /// Read the value under `key`. `Ok(None)` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write (or overwrite) the value under `key`.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode the JSON document under `key`.
///
/// Read failures and undecodable documents are absorbed: the fault is logged
/// as a warning and `None` is returned, exactly as if nothing were stored.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
    component: &'static str,
) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(raw) => raw?,
        Err(e) => {
            degraded(store, key, component, &e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            degraded(store, key, component, &ShotTermsError::from(e));
            None
        }
    }
}

/// Like [`load_json`], but a failed read is returned instead of absorbed.
///
/// An undecodable document is still logged and treated as absent, since the
/// next successful write replaces it.
pub async fn try_load_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
    component: &'static str,
) -> Result<Option<T>> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(None),
        Err(e) => {
            degraded(store, key, component, &e);
            return Err(e);
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            degraded(store, key, component, &ShotTermsError::from(e));
            Ok(None)
        }
    }
}

/// Encode `value` and write it under `key`.
///
/// Returns whether the write landed. Failures are logged, never raised.
pub async fn save_json<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
    component: &'static str,
) -> bool {
    let result = match serde_json::to_string(value) {
        Ok(json) => store.set(key, json).await,
        Err(e) => Err(e.into()),
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            degraded(store, key, component, &e);
            false
        }
    }
}

/// Delete `key`, absorbing failures. Returns whether the delete landed.
pub async fn remove_key(store: &dyn KvStore, key: &str, component: &'static str) -> bool {
    match store.remove(key).await {
        Ok(()) => true,
        Err(e) => {
            degraded(store, key, component, &e);
            false
        }
    }
}

fn degraded(store: &dyn KvStore, key: &str, component: &'static str, error: &ShotTermsError) {
    metrics::counter!(telemetry::STORAGE_DEGRADED_TOTAL, "component" => component).increment(1);
    warn!(
        store = store.name(),
        key,
        component,
        error = %error,
        "durable store unavailable, continuing without persisted state"
    );
}
