// src/risk.rs
//! Risk detection over clauses: a static table of per-category regex
//! patterns with one fixed explanation per category. The table is embedded
//! at build time and compiled once.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PatternTable {
    categories: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    name: String,
    patterns: Vec<String>,
    explanation: String,
}

/// One risk category with its compiled patterns.
#[derive(Debug)]
pub struct RiskCategory {
    pub name: String,
    pub explanation: String,
    patterns: Vec<Regex>,
}

impl RiskCategory {
    /// First-match-wins: any single pattern hit flags the whole category.
    fn matches(&self, clause: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(clause))
    }
}

static RISK_TABLE: Lazy<Vec<RiskCategory>> = Lazy::new(|| {
    let raw = include_str!("../risk_patterns.json");
    let table: PatternTable = serde_json::from_str(raw).expect("valid risk pattern table");
    table
        .categories
        .into_iter()
        .map(|entry| RiskCategory {
            patterns: entry
                .patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .expect("valid risk pattern regex")
                })
                .collect(),
            name: entry.name,
            explanation: entry.explanation,
        })
        .collect()
});

/// Detected categories and their explanation strings for one clause.
///
/// Categories are evaluated independently in table order; explanations are
/// deduplicated by exact string equality across categories, so two
/// categories sharing an explanation collapse into one entry. A clause with
/// no hits yields two empty vectors.
pub fn detect_risks(clause: &str) -> (Vec<String>, Vec<String>) {
    let mut risks = Vec::new();
    let mut explanations: Vec<String> = Vec::new();

    for category in RISK_TABLE.iter() {
        if category.matches(clause) {
            risks.push(category.name.clone());
            if !explanations.iter().any(|e| e == &category.explanation) {
                explanations.push(category.explanation.clone());
            }
        }
    }

    (risks, explanations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_compiles_with_expected_categories() {
        let names: Vec<&str> = RISK_TABLE.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["auto_renewal", "penalty", "termination", "liability"]
        );
    }

    #[test]
    fn detects_categories_case_insensitively() {
        let clause = "This contract shall AUTOMATICALLY RENEW for successive one-year terms.";
        let (risks, explanations) = detect_risks(clause);
        assert_eq!(risks, vec!["auto_renewal"]);
        assert_eq!(explanations, vec!["Could lock you into unwanted renewals."]);
    }

    #[test]
    fn multiple_categories_are_evaluated_independently() {
        let clause = "Either party may terminate this agreement and shall owe \
                      liquidated damages upon early exit.";
        let (risks, _) = detect_risks(clause);
        assert!(risks.iter().any(|r| r == "penalty"));
        assert!(risks.iter().any(|r| r == "termination"));
    }

    #[test]
    fn wildcard_patterns_span_words() {
        // "renewal.*unless.*notice"
        let clause = "The renewal takes effect unless sixty days prior written notice is given.";
        let (risks, _) = detect_risks(clause);
        assert_eq!(risks, vec!["auto_renewal"]);
    }

    #[test]
    fn no_match_yields_empty_sets() {
        let (risks, explanations) = detect_risks("The parties will meet quarterly for lunch.");
        assert!(risks.is_empty());
        assert!(explanations.is_empty());
    }

    #[test]
    fn detection_is_idempotent() {
        let clause = "Supplier shall not be liable for indirect damages; the agreement may \
                      automatically renew.";
        let first = detect_risks(clause);
        let second = detect_risks(clause);
        assert_eq!(first, second);
    }
}
