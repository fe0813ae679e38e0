//! Request and result types exposed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::terms::{
    AngleDirection, AngleHeight, LensType, Lighting, ParsedTerms, Perspective, ShotSize,
};

/// Terms already selected in a structured form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    #[serde(default)]
    pub shot_size: Option<ShotSize>,
    #[serde(default)]
    pub angle_height: Option<AngleHeight>,
    #[serde(default)]
    pub angle_direction: Option<AngleDirection>,
    #[serde(default)]
    pub perspective: Option<Perspective>,
    #[serde(default)]
    pub lens_type: Option<LensType>,
    #[serde(default)]
    pub lighting: Option<Lighting>,
    #[serde(default)]
    pub description: Option<String>,
}

impl FormFields {
    /// Convert to a fully trusted term set (`confidence = 1.0`).
    pub fn into_terms(self) -> ParsedTerms {
        ParsedTerms {
            shot_size: self.shot_size,
            angle_height: self.angle_height,
            angle_direction: self.angle_direction,
            perspective: self.perspective,
            lens_type: self.lens_type,
            lighting: self.lighting,
            description: self.description.filter(|d| !d.trim().is_empty()),
            confidence: 1.0,
        }
    }
}

/// Input accepted by `optimize`.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeInput {
    /// Structured form selection; bypasses matching and inference.
    Form(FormFields),
    /// Free-form shot description.
    FreeText(String),
}

impl From<FormFields> for OptimizeInput {
    fn from(fields: FormFields) -> Self {
        Self::Form(fields)
    }
}

impl From<String> for OptimizeInput {
    fn from(text: String) -> Self {
        Self::FreeText(text)
    }
}

impl From<&str> for OptimizeInput {
    fn from(text: &str) -> Self {
        Self::FreeText(text.to_string())
    }
}

/// Which strategy produced a [`PromptResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Dictionary match was confident enough.
    Local,
    /// Routed through the orchestrator (cache or inference service).
    Remote,
    /// Structured form input.
    Form,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Form => "form",
        }
    }
}

/// Outcome of `optimize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptResult {
    pub terms: ParsedTerms,
    pub method: Method,
    /// Served from the result cache without an inference call.
    #[serde(default)]
    pub cached: bool,
    /// Normalized prompt text rendered from `terms`.
    pub prompt: String,
}

impl PromptResult {
    pub fn new(terms: ParsedTerms, method: Method, cached: bool) -> Self {
        let prompt = terms.to_prompt();
        Self {
            terms,
            method,
            cached,
            prompt,
        }
    }
}
