//! Storage HTTP Handlers - 图片下载与上传表单解析

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::header,
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::ports::{image_content_type, ImageUpload};
use crate::application::ApplicationError;
use crate::infrastructure::http::error::{ApiError, ErrorResponse};
use crate::infrastructure::http::extract::AppPath;
use crate::infrastructure::http::state::AppState;

/// 从 multipart 表单中读取 `file` 字段
pub(crate) async fn read_image_upload(mut multipart: Multipart) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

        return Ok(ImageUpload {
            bytes: bytes.to_vec(),
            file_name,
            content_type,
        });
    }

    Err(ApiError::invalid_field("file", "is required"))
}

/// 下载已上传的图片
#[utoipa::path(
    get,
    path = "/api/storage/{filename}",
    tag = "storage",
    params(("filename" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "Image content", content_type = "image/*"),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
pub async fn download_image(
    State(state): State<Arc<AppState>>,
    AppPath(filename): AppPath<String>,
) -> Result<Response, ApiError> {
    let path = state
        .image_storage
        .locate(&filename)
        .await
        .map_err(ApplicationError::from)?;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open image {}: {}", filename, e)))?;
    let stream = ReaderStream::new(file);

    Response::builder()
        .header(header::CONTENT_TYPE, image_content_type(&filename))
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
