//! Product image uploads.

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::ImageUpload;
use crate::state::AppState;

/// Multipart field carrying the files.
const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub urls: Vec<String>,
    pub count: usize,
}

/// Upload every `files` part and return their public URLs.
pub async fn upload_images(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text())))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = field.bytes().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read {file_name}: {}", e.body_text()))
        })?;
        files.push(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let urls = state.media().upload_images(files).await?;
    tracing::info!(admin = %admin.clerk_id, count = urls.len(), "Product images uploaded");

    Ok(Json(UploadResponse {
        success: true,
        count: urls.len(),
        urls,
    }))
}
