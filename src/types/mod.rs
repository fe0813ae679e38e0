//! Public types for the shotterms API.

mod input;
mod terms;

pub use input::{FormFields, Method, OptimizeInput, PromptResult};
pub use terms::{
    AngleDirection, AngleHeight, FULLWIDTH_COMMA, Field, LensType, Lighting, ParsedTerms,
    Perspective, ShotSize, Term,
};
