//! Axum route handler for downloading generated documents.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::info;

use crate::documents::export::{export_docx, DOCX_MIME_TYPE};
use crate::documents::DocType;
use crate::errors::AppError;
use crate::session::existing_session_key;
use crate::state::AppState;

/// GET /download/:doc_type/docx
///
/// Exports the caller's stored resume or cover letter as a `.docx` attachment.
pub async fn handle_download(
    State(state): State<AppState>,
    session: Session,
    Path(doc_type): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let doc_type: DocType = doc_type
        .parse()
        .map_err(|_| AppError::validation("Invalid document type"))?;

    let not_found = || AppError::NotFound("No generated content found".to_string());

    let key = existing_session_key(&session, state.config.session_scope)
        .await?
        .ok_or_else(not_found)?;
    let text = state.store.get(key, doc_type).ok_or_else(not_found)?;

    let bytes = export_docx(&text)?;
    info!("Exported {} ({} bytes) for session {}", doc_type, bytes.len(), key);

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", doc_type.file_name()),
            ),
        ],
        bytes,
    ))
}
