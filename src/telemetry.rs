//! Telemetry metric name constants.
//!
//! Centralised metric names for shotterms operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `shotterms_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `method`: how a result was produced: "local", "remote" or "form"
//! - `backend`: inference backend: "local" or "remote"
//! - `status`: outcome: "ok" or "error"
//! - `outcome`: quota charge outcome: "granted" or "refused"

/// Total `optimize` requests.
///
/// Labels: `method`.
pub const REQUESTS_TOTAL: &str = "shotterms_requests_total";

/// Total result cache hits.
pub const CACHE_HITS_TOTAL: &str = "shotterms_cache_hits_total";

/// Total result cache misses.
pub const CACHE_MISSES_TOTAL: &str = "shotterms_cache_misses_total";

/// Total quota charge attempts.
///
/// Labels: `outcome` ("granted" | "refused").
pub const QUOTA_CHARGES_TOTAL: &str = "shotterms_quota_charges_total";

/// Total inference calls issued.
///
/// Labels: `backend`, `status` ("ok" | "error").
pub const INFERENCE_CALLS_TOTAL: &str = "shotterms_inference_calls_total";

/// Inference call duration in seconds.
///
/// Labels: `backend`.
pub const INFERENCE_DURATION_SECONDS: &str = "shotterms_inference_duration_seconds";

/// Total durable store operations that failed and were absorbed.
///
/// Labels: `component` ("cache" | "quota" | "monitor").
pub const STORAGE_DEGRADED_TOTAL: &str = "shotterms_storage_degraded_total";
