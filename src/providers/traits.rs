//! Provider traits for the inference backends the orchestrator calls.
//!
//! The orchestrator depends on these traits, not on concrete clients, so
//! tests and embedders can plug in their own backends.
//!
//! # Failure semantics
//!
//! - `probe` is a routing signal: `false` means "skip the local backend",
//!   never an error.
//! - `parse` returns `ServiceUnavailable` or `MalformedResponse` on failure.
//!   A local failure falls back to remote; a remote failure is terminal.

use async_trait::async_trait;

use crate::Result;
use crate::types::ParsedTerms;

/// The remote inference service.
#[async_trait]
pub trait RemoteInference: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Parse a shot description into terms.
    async fn parse(&self, text: &str) -> Result<ParsedTerms>;
}

/// An optional inference backend on the local machine.
#[async_trait]
pub trait LocalInference: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Whether the backend is reachable right now.
    async fn probe(&self) -> bool;

    /// Parse a shot description into terms.
    async fn parse(&self, text: &str) -> Result<ParsedTerms>;
}
