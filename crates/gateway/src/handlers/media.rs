//! Media store handlers: upload-auth parameters and best-effort deletes

use crate::AppState;
use axum::{extract::State, Json};
use pressroom_common::errors::{AppError, Result};
use pressroom_common::media::{AuthParams, DeleteOutcome, MediaStore};
use serde::{Deserialize, Serialize};

/// Mint short-lived upload-auth parameters for a client-side upload
pub async fn upload_auth(State(state): State<AppState>) -> Result<Json<AuthParams>> {
    Ok(Json(state.media.auth_params()?))
}

#[derive(Debug, Deserialize)]
pub struct MediaDeleteRequest {
    #[serde(rename = "fileIds", default)]
    pub file_ids: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct MediaDeleteResponse {
    pub success: bool,
    pub results: Vec<DeleteOutcome>,
}

/// Delete stored media by identifier.
///
/// Each identifier is attempted independently; a remote refusal for one id
/// is reported in its result entry and does not abort the batch.
pub async fn delete_media(
    State(state): State<AppState>,
    Json(request): Json<MediaDeleteRequest>,
) -> Result<Json<MediaDeleteResponse>> {
    let file_ids = request
        .file_ids
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| AppError::Validation {
            message: "fileIds array is required".into(),
            field: Some("fileIds".into()),
        })?;

    let mut results = Vec::with_capacity(file_ids.len());
    for file_id in &file_ids {
        results.push(state.media.delete(file_id).await?);
    }

    Ok(Json(MediaDeleteResponse {
        success: true,
        results,
    }))
}
