//! Document record handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::instrument;
use uuid::Uuid;

use sinetti_db::CreateDocument;

use crate::error::{SigningError, SigningResult};
use crate::models::{CreateDocumentRequest, CreateDocumentResponse, DocumentStatusResponse};
use crate::router::SigningState;

/// Create a document record and store the original bytes.
///
/// POST /documents
#[instrument(skip(state, req))]
pub async fn create(
    State(state): State<SigningState>,
    Json(req): Json<CreateDocumentRequest>,
) -> SigningResult<(StatusCode, Json<CreateDocumentResponse>)> {
    if req.file_name.trim().is_empty() || req.file_name.contains('/') {
        return Err(SigningError::InvalidRequest(
            "file_name must be a plain file name".to_string(),
        ));
    }

    let content = match &req.content_base64 {
        Some(encoded) => BASE64
            .decode(encoded)
            .map_err(|_| SigningError::InvalidRequest("content_base64 is not valid base64".to_string()))?,
        None => Vec::new(),
    };

    let document = state
        .repository
        .create(CreateDocument {
            file_name: req.file_name,
            sender_email: req.sender_email,
            recipient_email: req.recipient_email,
        })
        .await?;

    state
        .storage
        .upload(&document.storage_path(), content)
        .await?;

    tracing::info!(document_id = %document.id, "Document created");

    Ok((
        StatusCode::CREATED,
        Json(CreateDocumentResponse {
            id: document.id,
            status: document.status,
        }),
    ))
}

/// Status view of one document. Verified names are reported as booleans.
///
/// GET /documents/:id
#[instrument(skip(state))]
pub async fn get(
    State(state): State<SigningState>,
    Path(id): Path<Uuid>,
) -> SigningResult<Json<DocumentStatusResponse>> {
    let document = state
        .repository
        .find_by_id(id)
        .await?
        .ok_or(SigningError::NotFound(id))?;
    Ok(Json(DocumentStatusResponse::from(&document)))
}

/// Re-run finalization after a crash between the claim and `signed`.
///
/// POST /documents/:id/finalize/retry
#[instrument(skip(state))]
pub async fn retry_finalization(
    State(state): State<SigningState>,
    Path(id): Path<Uuid>,
) -> SigningResult<Json<serde_json::Value>> {
    let download_url = state.cosign.retry_finalization(id).await?;
    Ok(Json(serde_json::json!({
        "status": "done",
        "download_url": download_url,
    })))
}
