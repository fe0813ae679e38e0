//! Gateway implementation

mod builder;
mod orchestrator;
mod term_gateway;

pub use builder::{DEFAULT_LOCAL_THRESHOLD, ShotTerms, ShotTermsBuilder};
pub use orchestrator::Orchestrator;
pub use term_gateway::TermGateway;
