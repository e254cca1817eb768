// src/report.rs
//! Analysis assembly: pure, testable logic that maps segmented clauses to
//! the wire-format report. No I/O here; suitable for unit tests and future
//! offline evaluation.

use chrono::Local;
use serde::Serialize;

use crate::benchmark;
use crate::risk;

/// Only this many clauses are analyzed per document.
pub const MAX_CLAUSES: usize = 5;

/// One analyzed clause as it appears on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ClauseReport {
    pub original: String,
    pub risks: Vec<String>,
    pub explanation: Vec<String>,
    pub similarity: f64,
}

/// Binary overall risk level for the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Low,
}

/// The full success payload of the analyze flow.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub success: bool,
    pub filename: String,
    #[serde(rename = "uploadDate")]
    pub upload_date: String,
    #[serde(rename = "overallRisk")]
    pub overall_risk: RiskLevel,
    pub clauses: Vec<ClauseReport>,
}

/// Run risk detection and benchmarking over at most the first
/// [`MAX_CLAUSES`] clauses.
pub fn build_clause_reports(clauses: &[String]) -> Vec<ClauseReport> {
    clauses
        .iter()
        .take(MAX_CLAUSES)
        .map(|clause| {
            let (risks, explanation) = risk::detect_risks(clause);
            let similarity = benchmark::rounded(benchmark::similarity(clause));
            ClauseReport {
                original: clause.clone(),
                risks,
                explanation,
                similarity,
            }
        })
        .collect()
}

/// "high" if any clause carries at least one detected risk, else "low".
pub fn overall_risk(clauses: &[ClauseReport]) -> RiskLevel {
    if clauses.iter().any(|c| !c.risks.is_empty()) {
        RiskLevel::High
    } else {
        RiskLevel::Low
    }
}

/// Assemble the final report for a gated document.
pub fn build_report(filename: &str, clauses: &[String]) -> AnalysisReport {
    let reports = build_clause_reports(clauses);
    AnalysisReport {
        success: true,
        filename: filename.to_string(),
        upload_date: Local::now().to_rfc3339(),
        overall_risk: overall_risk(&reports),
        clauses: reports,
    }
}
