// src/segment.rs
//! Clause segmentation: layout/sentence heuristics, no NLP. A clause
//! boundary is a blank line, or a period followed by an uppercase letter.

use once_cell::sync::Lazy;
use regex::Regex;

/// Candidates at or below this many trimmed characters are dropped
/// (headings, page numbers, signature lines).
pub const MIN_CLAUSE_CHARS: usize = 50;

// The sentence boundary wants lookahead (`\.\s*(?=[A-Z])`), which the regex
// crate does not support; the uppercase letter is matched and handed back to
// the next clause by the split loop below.
static BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n|\.\s*[A-Z]").expect("valid clause boundary regex"));

/// Split raw document text into clause candidates, trim them, and keep the
/// ones longer than [`MIN_CLAUSE_CHARS`]. Source order is preserved; there
/// is no deduplication.
pub fn extract_clauses(text: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut last = 0;

    for m in BOUNDARY.find_iter(text) {
        let piece = &text[last..m.start()];
        push_candidate(&mut clauses, piece);
        if m.as_str().starts_with('.') {
            // Keep the matched uppercase letter: it opens the next clause.
            last = m.end() - 1;
        } else {
            last = m.end();
        }
    }
    push_candidate(&mut clauses, &text[last..]);

    clauses
}

fn push_candidate(out: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if trimmed.chars().count() > MIN_CLAUSE_CHARS {
        out.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_A: &str =
        "This agreement shall automatically renew unless written notice is given by either party";
    const LONG_B: &str =
        "Either party may terminate the agreement for material breach of its obligations";

    #[test]
    fn splits_on_blank_lines() {
        let text = format!("{LONG_A}\n\n{LONG_B}");
        let clauses = extract_clauses(&text);
        assert_eq!(clauses, vec![LONG_A.to_string(), LONG_B.to_string()]);
    }

    #[test]
    fn splits_on_period_before_uppercase() {
        let text = format!("{LONG_A}. {LONG_B}.");
        let clauses = extract_clauses(&text);
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0], LONG_A);
        // The uppercase letter that triggered the split opens the next clause.
        assert!(clauses[1].starts_with("Either party"));
    }

    #[test]
    fn period_before_lowercase_is_not_a_boundary() {
        let text = format!("{LONG_A} under cl. 4 of this schedule and its annexes thereto");
        let clauses = extract_clauses(&text);
        assert_eq!(clauses.len(), 1);
    }

    #[test]
    fn short_candidates_are_dropped() {
        let text = format!("Section 1\n\n{LONG_A}\n\nPage 3 of 9");
        let clauses = extract_clauses(&text);
        assert_eq!(clauses, vec![LONG_A.to_string()]);
        for c in &clauses {
            assert!(c.trim().chars().count() > MIN_CLAUSE_CHARS);
        }
    }

    #[test]
    fn order_is_preserved_without_dedup() {
        let text = format!("{LONG_A}\n\n{LONG_B}\n\n{LONG_A}");
        let clauses = extract_clauses(&text);
        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses[0], clauses[2]);
    }

    #[test]
    fn empty_text_yields_no_clauses() {
        assert!(extract_clauses("").is_empty());
        assert!(extract_clauses("   \n\n   ").is_empty());
    }
}
