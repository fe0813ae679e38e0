//! Inference backends.
//!
//! The remote service is an OpenAI-compatible chat completions endpoint.
//! The local backend is a liveness probe whose parse always falls through.

pub mod local;
pub mod prompt;
pub mod remote;
pub mod traits;

pub use local::{LocalConfig, LocalProbe};
pub use remote::{RemoteClient, RemoteConfig};
pub use traits::{LocalInference, RemoteInference};
