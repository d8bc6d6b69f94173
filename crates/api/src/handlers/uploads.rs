//! Multipart evidence upload.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;

use firewatch_core::media::MediaKind;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Public URL of the stored object.
    pub url: String,
    /// Storage URI to pass to `/analyze`.
    pub gcs_uri: String,
}

/// POST /upload/{kind}
///
/// Expects a multipart field named after the kind (`photo`, `video`,
/// `audio`). A missing field, or a body that is not multipart at all, is
/// rejected before anything is uploaded.
pub async fn upload(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let kind: MediaKind = kind.parse()?;
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let bytes = read_field(&mut multipart, kind.as_str())
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("No {kind} file provided")))?;

    let stored = state
        .pipeline
        .upload_evidence(kind, bytes)
        .await
        .ok_or(AppError::UploadFailed(kind))?;

    Ok(Json(UploadResponse {
        success: true,
        url: stored.public_url,
        gcs_uri: stored.storage_uri,
    }))
}

/// Bytes of the first field called `name`, skipping any others.
async fn read_field(multipart: &mut Multipart, name: &str) -> AppResult<Option<Vec<u8>>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() == Some(name) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Some(data.to_vec()));
        }
    }
    Ok(None)
}
