//! Response Splitter: separates the tailored resume from the cover letter.

use crate::documents::SessionDocuments;
use crate::tailoring::COVER_LETTER_MARKER;

/// Splits on the first `COVER LETTER:` marker and trims both halves.
/// Without a marker the whole completion is the resume and the cover letter is empty.
pub fn split_sections(full_text: &str) -> SessionDocuments {
    let (resume, cover) = full_text
        .split_once(COVER_LETTER_MARKER)
        .unwrap_or((full_text, ""));

    SessionDocuments {
        resume_text: resume.trim().to_string(),
        cover_letter_text: cover.trim().to_string(),
    }
}
