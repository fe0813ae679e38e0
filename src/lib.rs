//! shotterms - camera-shot description normalizer
//!
//! Turns a free-form or form-based description of a camera shot into a
//! fixed vocabulary of photography terms (shot size, angle, perspective,
//! lens, lighting). A deterministic dictionary match answers confident
//! inputs; everything else goes through a persistent result cache, a daily
//! quota and a remote inference service.
//!
//! # Example
//!
//! ```rust,no_run
//! use shotterms::{Method, ShotTerms};
//!
//! #[tokio::main]
//! async fn main() -> shotterms::Result<()> {
//!     let gateway = ShotTerms::builder()
//!         .service_credential("sk-your-key")
//!         .build()?;
//!
//!     let result = gateway.optimize("中景, 轻微俯拍, 3/4正面").await?;
//!     assert_eq!(result.method, Method::Local);
//!     println!("{}", result.prompt);
//!
//!     let result = gateway.optimize("人物站在街道中央看向远方").await?;
//!     println!("{} (cached: {})", result.prompt, result.cached);
//!     Ok(())
//! }
//! ```
//!
//! # Form input
//!
//! ```rust
//! use shotterms::{FormFields, Lighting, ShotSize};
//!
//! let terms = FormFields {
//!     shot_size: Some(ShotSize::CloseUp),
//!     lighting: Some(Lighting::Backlight),
//!     description: Some("雨夜".into()),
//!     ..Default::default()
//! }
//! .into_terms();
//! assert_eq!(terms.to_prompt(), "特写(CU)，逆光(Backlight)，雨夜");
//! ```

pub mod cache;
pub mod clock;
#[cfg(feature = "cli")]
pub mod config;
pub mod error;
pub mod gateway;
pub mod matcher;
pub mod monitor;
pub mod providers;
pub mod quota;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use error::{Result, ShotTermsError};
pub use gateway::{ShotTerms, ShotTermsBuilder, TermGateway};

pub use cache::{CacheConfig, CacheStats, ResultCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use matcher::{MatchOutcome, TermMatcher};
pub use monitor::{CallMonitor, CallRecord, CallStats, MonitorConfig};
pub use providers::{
    LocalConfig, LocalInference, LocalProbe, RemoteClient, RemoteConfig, RemoteInference,
};
pub use quota::{QuotaConfig, QuotaLedger, QuotaStats};
pub use store::{FileStore, KvStore, MemoryStore};

// Re-export all types
pub use types::{
    AngleDirection, AngleHeight, Field, FormFields, LensType, Lighting, Method, OptimizeInput,
    ParsedTerms, Perspective, PromptResult, ShotSize, Term,
};
