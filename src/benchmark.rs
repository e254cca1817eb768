// src/benchmark.rs
//! Clause benchmarking: TF-IDF cosine similarity between a clause and one
//! fixed reference sentence. The corpus is just those two documents, so idf
//! statistics are recomputed per call; nothing is shared across requests.
//!
//! Tokenization and weighting follow the classic vectorizer defaults:
//! lowercased word tokens of two or more characters, smoothed idf
//! `ln((1 + n) / (1 + df)) + 1`, L2-normalized vectors.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// The baseline every clause is scored against.
pub const STANDARD_CLAUSE: &str =
    "This is a standard contractual provision with balanced terms.";

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

/// Cosine similarity between `clause` and [`STANDARD_CLAUSE`], in [0, 1].
///
/// Token-free input (empty, whitespace, punctuation-only) scores 0.0 by
/// policy rather than erroring.
pub fn similarity(clause: &str) -> f64 {
    similarity_between(clause, STANDARD_CLAUSE)
}

/// Round a similarity score to two decimal places for the wire format.
pub fn rounded(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

fn tokenize(text: &str) -> Vec<String> {
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

fn similarity_between(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    // Term index over the union vocabulary of the two documents.
    let mut vocab: BTreeMap<&str, usize> = BTreeMap::new();
    for t in tokens_a.iter().chain(tokens_b.iter()) {
        let next = vocab.len();
        vocab.entry(t.as_str()).or_insert(next);
    }

    let tf = |tokens: &[String]| -> Vec<f64> {
        let mut counts = vec![0.0; vocab.len()];
        for t in tokens {
            counts[vocab[t.as_str()]] += 1.0;
        }
        counts
    };
    let tf_a = tf(&tokens_a);
    let tf_b = tf(&tokens_b);

    // Smoothed idf over the two-document corpus (df is 1 or 2).
    let n_docs = 2.0;
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for i in 0..vocab.len() {
        let df = (tf_a[i] > 0.0) as u8 + (tf_b[i] > 0.0) as u8;
        let idf = ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0;
        let wa = tf_a[i] * idf;
        let wb = tf_b[i] * idf;
        dot += wa * wb;
        norm_a += wa * wa;
        norm_b += wb * wb;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}
