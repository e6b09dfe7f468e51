//! Avatar uploads kept in memory and served back under `/uploads`.

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::AppState;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct StoredUpload {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

pub(crate) async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let extension = field
            .file_name()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;

        if data.len() > MAX_UPLOAD_BYTES {
            return Err(ServerError::PayloadTooLarge);
        }
        if !content_type.starts_with("image/") {
            return Err(ServerError::UnsupportedMediaType);
        }

        let key = format!("{}{extension}", Uuid::new_v4());
        info!(%key, size = data.len(), %content_type, "stored upload");
        state.uploads.write().await.insert(
            key.clone(),
            StoredUpload {
                content_type,
                data: data.to_vec(),
            },
        );
        let url = format!("{}/uploads/{key}", state.public_url);
        return Ok(Json(UploadResponse { url }));
    }

    Err(ServerError::BadRequest("missing file field".to_string()))
}

pub(crate) async fn get_upload(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let uploads = state.uploads.read().await;
    let upload = uploads.get(&key).cloned().ok_or(ServerError::NotFound)?;
    Ok(([(header::CONTENT_TYPE, upload.content_type)], upload.data))
}
