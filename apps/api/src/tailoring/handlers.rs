//! Axum route handler for the generate endpoint.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tower_sessions::Session;
use tracing::info;

use crate::errors::AppError;
use crate::session::session_key_or_create;
use crate::state::AppState;
use crate::tailoring::generator::{tailor_documents, TailorUpload};

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "jobDescription";

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
}

/// POST /generate
///
/// Multipart form: `resume` (PDF file) and `jobDescription` (text).
/// On success the tailored resume and cover letter are stored for this caller's
/// session and can be fetched from `/download/:doc_type/docx`.
pub async fn handle_generate(
    State(state): State<AppState>,
    session: Session,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let multipart =
        multipart.map_err(|_| AppError::validation("Request must be multipart/form-data"))?;
    let upload = read_upload(multipart).await?;

    let documents =
        tailor_documents(state.generator.as_ref(), &state.composer, upload).await?;

    // Key is resolved after generation so a failed request never creates a session.
    let key = session_key_or_create(&session, state.config.session_scope).await?;
    state.store.put(key, documents);
    info!("Stored tailored documents for session {key}");

    Ok(Json(GenerateResponse { success: true }))
}

/// Collects the form fields, then validates them in a fixed order: file present,
/// description present, filename non-empty, `.pdf` extension.
async fn read_upload(mut multipart: Multipart) -> Result<TailorUpload, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(RESUME_FIELD) => {
                // A plain form field named `resume` is not a file upload.
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let bytes = field.bytes().await.map_err(multipart_error)?;
                resume = Some((file_name, bytes));
            }
            Some(JOB_DESCRIPTION_FIELD) => {
                job_description = field.text().await.map_err(multipart_error)?;
            }
            _ => {}
        }
    }

    let (file_name, resume_pdf) =
        resume.ok_or_else(|| AppError::validation("No resume file uploaded"))?;

    if job_description.trim().is_empty() {
        return Err(AppError::validation("No job description provided"));
    }
    if file_name.is_empty() {
        return Err(AppError::validation("No selected file"));
    }
    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(AppError::validation("File must be a PDF"));
    }

    Ok(TailorUpload {
        file_name,
        resume_pdf,
        job_description,
    })
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    tracing::warn!("Rejected multipart body: {e}");
    AppError::validation("Invalid multipart form data")
}
