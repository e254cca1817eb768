// src/extract.rs
//! PDF text extraction. Thin wrapper over the `pdf-extract` crate so the
//! rest of the pipeline only ever sees plain text.

use anyhow::Context;

/// Extract raw text from an in-memory PDF byte stream.
///
/// Any extraction failure (corrupt file, encrypted PDF, not a PDF at all)
/// propagates to the handler boundary and becomes a 500 response.
pub fn extract_text(bytes: &[u8]) -> anyhow::Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .context("failed to extract text from uploaded PDF")?;
    Ok(text)
}
