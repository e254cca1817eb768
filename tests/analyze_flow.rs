// tests/analyze_flow.rs
//
// End-to-end /analyze tests over a real (tiny) PDF generated in the test,
// so the whole flow runs: multipart -> extraction -> gate -> segmentation ->
// risk detection -> benchmarking -> wire JSON.

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _;

use contractiq::{create_router, AppState, ModelSet};

const BODY_LIMIT: usize = 1024 * 1024;

/// The §4 risk trifecta: auto-renewal, termination, and liquidated damages.
const RISKY_SENTENCE: &str = "This agreement shall automatically renew unless written notice \
is given, and either party may terminate the agreement for breach, subject to liquidated damages.";

fn disabled_router() -> Router {
    // No classifier: the keyword rule alone must carry legal documents.
    create_router(AppState::new(ModelSet::disabled()))
}

/// Build a minimal single-page PDF with one line of Helvetica text per entry
/// in `lines`. Cross-reference offsets are computed, so standard parsers
/// accept it.
fn minimal_pdf(lines: &[&str]) -> Vec<u8> {
    let mut stream = String::from("BT\n/F1 12 Tf\n72 720 Td\n16 TL\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            stream.push_str("T*\n");
        }
        let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
        stream.push_str(&format!("({escaped}) Tj\n"));
    }
    stream.push_str("ET");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, obj).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

fn upload_request(filename: &str, pdf: Vec<u8>) -> Request<Body> {
    let boundary = "contractiq-e2e-boundary";
    let mut payload = Vec::new();
    payload.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    payload.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    payload.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    payload.extend_from_slice(&pdf);
    payload.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(payload))
        .expect("build POST /analyze")
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("response is json")
}

#[tokio::test]
async fn risky_contract_is_analyzed_as_high_risk() {
    let app = disabled_router();
    let pdf = minimal_pdf(&[RISKY_SENTENCE]);

    let resp = app
        .oneshot(upload_request("contract.pdf", pdf))
        .await
        .expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["filename"], "contract.pdf");
    assert!(v.get("uploadDate").is_some(), "missing 'uploadDate'");
    assert_eq!(v["overallRisk"], "high");

    let clauses = v["clauses"].as_array().expect("clauses array");
    assert!(!clauses.is_empty(), "at least one clause expected");
    let risks: Vec<&str> = clauses
        .iter()
        .flat_map(|c| c["risks"].as_array().unwrap())
        .map(|r| r.as_str().unwrap())
        .collect();
    for expected in ["auto_renewal", "termination", "penalty"] {
        assert!(risks.contains(&expected), "missing {expected} in {risks:?}");
    }

    for c in clauses {
        let s = c["similarity"].as_f64().expect("similarity is a number");
        assert!((0.0..=1.0).contains(&s));
        assert!(c["explanation"].is_array());
    }
}

#[tokio::test]
async fn casual_text_is_rejected_as_not_a_legal_contract() {
    let app = disabled_router();
    let pdf = minimal_pdf(&["Hello, how are you today?"]);

    let resp = app
        .oneshot(upload_request("hello.pdf", pdf))
        .await
        .expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = read_json(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["error"], "Not a legal contract");
}

#[tokio::test]
async fn analyze_never_reports_more_than_five_clauses() {
    let app = disabled_router();
    // Eight sentence-sized clauses; each ends with a period and the next one
    // starts uppercase, so the segmenter sees a boundary between them.
    let para = "Each party to this agreement acknowledges the contract terms stated herein \
                and agrees to perform its obligations in full";
    let lines: Vec<String> = (0..8).map(|i| format!("{para} under section {i}.")).collect();
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let pdf = minimal_pdf(&line_refs);

    let resp = app
        .oneshot(upload_request("sections.pdf", pdf))
        .await
        .expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let clauses = v["clauses"].as_array().expect("clauses array");
    assert!(
        clauses.len() <= 5,
        "at most 5 clauses may be analyzed, got {}",
        clauses.len()
    );
}
