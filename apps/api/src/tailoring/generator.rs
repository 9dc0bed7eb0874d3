//! Tailoring: orchestrates one generation request.
//!
//! Flow: extract PDF text → compose prompt → LLM generate → split sections.
//! Storing the result is the caller's job so a failed request never touches the store.

use bytes::Bytes;
use tracing::{info, warn};

use crate::documents::SessionDocuments;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::tailoring::extractor::extract_text_blocking;
use crate::tailoring::prompts::PromptComposer;
use crate::tailoring::splitter::split_sections;
use crate::tailoring::COVER_LETTER_MARKER;

/// A validated `/generate` upload.
#[derive(Debug, Clone)]
pub struct TailorUpload {
    pub file_name: String,
    pub resume_pdf: Bytes,
    pub job_description: String,
}

/// Runs the pipeline for one upload. At most one generation call is made.
pub async fn tailor_documents(
    generator: &dyn TextGenerator,
    composer: &PromptComposer,
    upload: TailorUpload,
) -> Result<SessionDocuments, AppError> {
    info!(
        "Extracting text from {} ({} bytes)",
        upload.file_name,
        upload.resume_pdf.len()
    );
    let resume_text = extract_text_blocking(upload.resume_pdf).await?;
    if resume_text.trim().is_empty() {
        warn!("{} has no extractable text; generating anyway", upload.file_name);
    }

    let prompt = composer.compose(&resume_text, &upload.job_description);
    info!("Requesting tailored documents (prompt: {} chars)", prompt.len());
    let completion = generator.generate(&prompt).await?;

    match completion.matches(COVER_LETTER_MARKER).count() {
        0 => warn!("Completion has no {COVER_LETTER_MARKER:?} marker; cover letter will be empty"),
        1 => {}
        n => warn!("Completion contains {n} {COVER_LETTER_MARKER:?} markers; splitting on the first"),
    }

    let documents = split_sections(&completion);
    info!(
        "Generated resume ({} chars) and cover letter ({} chars)",
        documents.resume_text.len(),
        documents.cover_letter_text.len()
    );
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fake::{CannedGenerator, Reply};
    use crate::tailoring::extractor::test_pdf::build_pdf;

    fn upload(pdf: Vec<u8>) -> TailorUpload {
        TailorUpload {
            file_name: "resume.pdf".to_string(),
            resume_pdf: Bytes::from(pdf),
            job_description: "Backend role requiring Go and distributed systems".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pipeline_splits_completion() {
        let generator = CannedGenerator::text(
            "Jane Doe\nBackend Engineer\n\nCOVER LETTER:\nDear Hiring Manager,\nI build systems.",
        );
        let docs = tailor_documents(
            &generator,
            &PromptComposer::default(),
            upload(build_pdf(&[&["Jane Doe", "Software Engineer"]])),
        )
        .await
        .unwrap();

        assert_eq!(docs.resume_text, "Jane Doe\nBackend Engineer");
        assert_eq!(docs.cover_letter_text, "Dear Hiring Manager,\nI build systems.");
    }

    #[tokio::test]
    async fn test_prompt_carries_extracted_text_and_job_description() {
        let generator = CannedGenerator::text("resume\nCOVER LETTER:\ncover");
        tailor_documents(
            &generator,
            &PromptComposer::default(),
            upload(build_pdf(&[&["Jane Doe"]])),
        )
        .await
        .unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Jane Doe"));
        assert!(prompts[0].contains("Backend role requiring Go and distributed systems"));
    }

    #[tokio::test]
    async fn test_unreadable_pdf_never_reaches_generator() {
        let generator = CannedGenerator::text("unused");
        let err = tailor_documents(
            &generator,
            &PromptComposer::default(),
            upload(b"%PDF-garbage".to_vec()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Extraction(_)));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported() {
        let generator = CannedGenerator::new(Reply::ApiError(401));
        let err = tailor_documents(
            &generator,
            &PromptComposer::default(),
            upload(build_pdf(&[&["Jane Doe"]])),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_distinct() {
        let generator = CannedGenerator::new(Reply::Timeout);
        let err = tailor_documents(
            &generator,
            &PromptComposer::default(),
            upload(build_pdf(&[&["Jane Doe"]])),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }
}
