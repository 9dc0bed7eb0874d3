//! Text Extractor: uploaded PDF bytes to plain text.

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("not a readable PDF: {0}")]
    Malformed(String),

    #[error("PDF parser aborted: {0}")]
    Aborted(String),
}

/// Concatenates the text of every page in page order. No OCR; a PDF with no text
/// layer yields an empty string.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Malformed(e.to_string()))
}

/// Runs `extract_text` on the blocking pool. A panic inside the PDF parser surfaces
/// as `ExtractionError::Aborted`.
pub async fn extract_text_blocking(bytes: Bytes) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| ExtractionError::Aborted(e.to_string()))?
}
