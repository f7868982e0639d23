use crate::config::upload::UploadConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::UploadService;
use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Public path to put into a post form's `image` field
    pub url: String,
}

/// Upload a post image.
/// POST /upload/image (multipart form: field "file")
#[utoipa::path(
    post,
    path = "/api/v1/upload/image",
    security(("jwt_token" = [])),
    request_body(content_type = "multipart/form-data", description = "Image in the `file` field"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type", body = AppError),
        (status = 413, description = "File too large", body = AppError),
    ),
    tag = "upload"
)]
pub async fn upload_image(
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| read_error("Failed to read upload", e))?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| read_error("Failed to read file data", e))?;

    let url = UploadService::save_post_image(&config, &data, &content_type).await?;
    tracing::info!(user_id = auth_user.user_id, %url, "Post image uploaded");

    Ok(ApiResponse::ok(UploadResponse { url }))
}

/// A body cut off by the route's size limit is a 413, anything else a 400.
fn read_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("{}: {}", context, err))
    }
}
