//! System instructions for the inference service and parsing of its answer.

use serde_json::{Map, Value};
use tracing::warn;

use crate::matcher::synonyms;
use crate::types::{Field, ParsedTerms, Term};
use crate::{Result, ShotTermsError};

/// Confidence assumed when the service does not report one.
pub const DEFAULT_REMOTE_CONFIDENCE: f64 = 0.8;

/// Build the system instructions, embedding every controlled vocabulary.
pub fn system_instructions() -> String {
    let mut out = String::from(
        "You convert a free-form description of a camera shot into standard \
         photography terms.\n\
         Answer with a single JSON object and nothing else. Allowed keys:\n",
    );
    for field in Field::PRIORITY {
        out.push_str(&format!(
            "- \"{}\": one of [{}] or null\n",
            field.key(),
            field
                .labels()
                .iter()
                .map(|l| format!("\"{l}\""))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    out.push_str(
        "- \"description\": remaining visual content that fits no field above, or null\n\
         - \"confidence\": your confidence between 0 and 1\n\
         Use the values exactly as listed. Leave a key null when the description does \
         not say anything about it.",
    );
    out
}

/// Parse the service's message content into terms.
///
/// The content must be a JSON object, optionally wrapped in a Markdown code
/// fence. Absent and null keys stay unset. A term value that is neither a
/// listed label nor a known synonym is dropped with a warning.
pub fn parse_terms(content: &str) -> Result<ParsedTerms> {
    let body = strip_code_fence(content);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ShotTermsError::MalformedResponse(format!("response content is not JSON: {e}"))
    })?;
    let Value::Object(object) = value else {
        return Err(ShotTermsError::MalformedResponse(
            "response content is not a JSON object".to_string(),
        ));
    };

    let mut terms = ParsedTerms::default();
    for field in Field::PRIORITY {
        if let Some(term) = term_field(&object, field) {
            terms.claim(term);
        }
    }
    terms.description = object
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from);

    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_REMOTE_CONFIDENCE);
    Ok(terms.with_confidence(confidence))
}

fn term_field(object: &Map<String, Value>, field: Field) -> Option<Term> {
    match object.get(field.key())? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => {
            let term = synonyms::resolve(field, s);
            if term.is_none() {
                warn!(field = field.key(), value = %s, "dropping term outside the vocabulary");
            }
            term
        }
        other => {
            warn!(field = field.key(), value = %other, "dropping non-string term");
            None
        }
    }
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // drop the info string ("json") on the opening line
    match rest.find('\n') {
        Some(idx) => rest[idx + 1..].trim(),
        None => rest.trim(),
    }
}
