//! Document Exporter: wraps generated text in a minimal `.docx` package.
//!
//! One paragraph, one run, no styling. Line breaks in the text become in-run breaks so
//! the paragraph stays single while readers still show the original lines.

use std::io::Cursor;

use docx_rs::{BreakType, Docx, Paragraph, Run};
use thiserror::Error;

pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to package docx: {0}")]
    Pack(String),
}

/// Builds a `.docx` whose body is `text`.
pub fn export_docx(text: &str) -> Result<Vec<u8>, ExportError> {
    let mut run = Run::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line.trim_end_matches('\r'));
    }

    let mut buf = Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(Paragraph::new().add_run(run))
        .build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Pack(e.to_string()))?;

    Ok(buf.into_inner())
}
