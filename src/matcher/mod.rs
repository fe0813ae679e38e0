//! Deterministic term matching with confidence scoring.
//!
//! The matcher splits a shot description into tokens, resolves each token
//! against the six synonym tables and reports how much of the input it
//! understood. Matching is a pure function of the input text.
//!
//! # Token resolution
//!
//! Tables are consulted in the fixed order shot size, angle height, angle
//! direction, perspective, lens type, lighting. The first table containing a
//! token owns it: the token counts as matched and claims that table's field
//! if the field is still unset. It never falls through to a later table,
//! even when its own field is already taken.
//!
//! ```rust
//! use shotterms::matcher::match_terms;
//! use shotterms::ShotSize;
//!
//! let outcome = match_terms("中景, 逆光, 雨夜");
//! assert_eq!(outcome.terms.shot_size, Some(ShotSize::MediumShot));
//! assert_eq!(outcome.terms.description.as_deref(), Some("雨夜"));
//! assert_eq!(outcome.matched_tokens, 2);
//! ```

pub mod synonyms;

use crate::types::{FULLWIDTH_COMMA, ParsedTerms};

use synonyms::{fold, tables};

/// Characters that separate tokens.
pub const SEPARATORS: &[char] = &[',', '，', '、', ';', '；', '|', '。', '\n', '\r'];

/// Words that mark an input as narrative prose rather than a term list.
pub const NARRATIVE_MARKERS: &[&str] = &[
    "character",
    "camera",
    "scene",
    "stands",
    "walks",
    "looks",
    "人物",
    "镜头",
    "场景",
    "站在",
    "走向",
    "看向",
];

/// Below this confidence an input is complex.
pub const COMPLEX_CONFIDENCE: f64 = 0.5;

/// Inputs longer than this (in characters) with no matches are complex.
pub const LONG_INPUT_CHARS: usize = 20;

const DELIMITER: char = ',';

/// Result of matching one input.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub terms: ParsedTerms,
    /// Tokens resolved by some synonym table.
    pub matched_tokens: usize,
    /// Non-empty tokens in the input.
    pub total_tokens: usize,
    /// The input reads as prose the dictionary cannot handle.
    pub is_complex: bool,
}

impl MatchOutcome {
    pub fn confidence(&self) -> f64 {
        self.terms.confidence
    }
}

/// Stateless handle over the synonym tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermMatcher;

impl TermMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Match `text` against the synonym tables.
    pub fn match_text(&self, text: &str) -> MatchOutcome {
        match_terms(text)
    }
}

/// Map separators to one delimiter and collapse whitespace runs.
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| if SEPARATORS.contains(&c) { DELIMITER } else { c })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into trimmed, non-empty tokens.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split(DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Match `text` against the synonym tables.
pub fn match_terms(text: &str) -> MatchOutcome {
    let normalized = normalize(text);
    let tokens = tokenize(&normalized);

    let mut terms = ParsedTerms::default();
    let mut matched = 0usize;
    let mut unmatched: Vec<&str> = Vec::new();

    for &token in &tokens {
        let key = fold(token);
        match tables().iter().find_map(|table| table.lookup(&key)) {
            Some(term) => {
                matched += 1;
                terms.claim(term);
            }
            None => unmatched.push(token),
        }
    }

    if !unmatched.is_empty() {
        terms.description = Some(unmatched.join(FULLWIDTH_COMMA));
    }

    let total = tokens.len();
    terms = terms.with_confidence(matched as f64 / total.max(1) as f64);
    let is_complex = is_complex(&normalized, terms.confidence, matched);

    MatchOutcome {
        terms,
        matched_tokens: matched,
        total_tokens: total,
        is_complex,
    }
}

fn is_complex(normalized: &str, confidence: f64, matched: usize) -> bool {
    if confidence < COMPLEX_CONFIDENCE {
        return true;
    }
    if normalized.chars().count() > LONG_INPUT_CHARS && matched == 0 {
        return true;
    }
    let lowered = normalized.to_lowercase();
    matched < 2 && NARRATIVE_MARKERS.iter().any(|m| lowered.contains(m))
}
