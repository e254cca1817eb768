// src/gate.rs
//! Legal-document gate: a cheap keyword heuristic with a zero-shot
//! classifier fallback. Classifier failures are absorbed; the gate only
//! ever answers yes or no.

use metrics::counter;
use tracing::{debug, warn};

use crate::inference::DynClassifier;

/// Vocabulary counted by the keyword rule (case-insensitive substrings).
const LEGAL_TERMS: [&str; 8] = [
    "agreement",
    "contract",
    "party",
    "clause",
    "whereas",
    "hereto",
    "indemnify",
    "notwithstanding",
];

/// Combined occurrence count at which a document is legal without asking
/// the model.
const KEYWORD_THRESHOLD: usize = 3;

/// Candidate labels handed to the zero-shot fallback.
const CANDIDATE_LABELS: [&str; 3] = ["legal document", "casual text", "news article"];
const LEGAL_LABEL: &str = "legal document";
const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// How much of the document the fallback classifier sees (characters).
const CLASSIFIER_PREFIX_CHARS: usize = 512;

/// Decide whether `text` is a legal contract.
///
/// Fails closed on blank text. The keyword rule short-circuits; the
/// classifier is only consulted below the threshold, and any classifier
/// failure falls through to `false`.
pub async fn is_legal_document(classifier: &DynClassifier, text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }

    let hits = keyword_hits(text);
    if hits >= KEYWORD_THRESHOLD {
        debug!(hits, "legal gate passed on keywords");
        return true;
    }

    let prefix = char_prefix(text, CLASSIFIER_PREFIX_CHARS);
    match classifier.classify(prefix, &CANDIDATE_LABELS).await {
        Some(result) => match result.top() {
            Some((label, score)) if label == LEGAL_LABEL && score > CONFIDENCE_THRESHOLD => {
                debug!(score, "legal gate passed on classifier");
                true
            }
            _ => false,
        },
        None => {
            // Soft failure: counted and logged, never surfaced.
            warn!(
                provider = classifier.provider_name(),
                "zero-shot classification unavailable, gating closed"
            );
            counter!("model_fallbacks_total").increment(1);
            false
        }
    }
}

/// Total occurrence count of all legal terms in `text`, case-insensitive.
/// Overlapping terms count independently, matching plain substring counts.
pub fn keyword_hits(text: &str) -> usize {
    let lower = text.to_lowercase();
    LEGAL_TERMS
        .iter()
        .map(|term| lower.matches(term).count())
        .sum()
}

/// First `n` characters of `s`, never splitting a UTF-8 boundary.
fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
