use crate::config::upload::UploadConfig;
use crate::error::{AppError, AppResult};
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

/// Post images are stored under this subdirectory of the upload root.
pub const POST_IMAGES_DIR: &str = "posts_images";

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5 MB

/// Request body limit for the upload route: one maximal file plus room for
/// the multipart boundaries and part headers.
pub const MAX_UPLOAD_BODY: usize = MAX_FILE_SIZE + 64 * 1024;

/// Map an accepted image content type to the extension files are stored with.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Check the leading bytes against the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        "image/png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "image/gif" => data.starts_with(b"GIF8"),
        "image/webp" => data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP",
        _ => false,
    }
}

/// Whether `path` looks like something `save_post_image` handed out:
/// `/uploads/posts_images/<uuid>.<ext>` with nothing that could escape the
/// upload directory.
pub fn is_uploaded_image_path(path: &str) -> bool {
    let prefix = format!("{}/{}/", UploadConfig::PUBLIC_PREFIX, POST_IMAGES_DIR);
    let Some(file_name) = path.strip_prefix(&prefix) else {
        return false;
    };
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return false;
    };
    Uuid::parse_str(stem).is_ok() && matches!(ext, "jpg" | "png" | "gif" | "webp")
}

pub struct UploadService;

impl UploadService {
    /// Store an uploaded post image and return its public path
    /// (e.g. `/uploads/posts_images/<uuid>.jpg`).
    pub async fn save_post_image(
        config: &UploadConfig,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<String> {
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge);
        }

        let Some(ext) = extension_for(content_type) else {
            return Err(AppError::Validation(format!(
                "Unsupported file type: {}. Allowed: jpeg, png, gif, webp",
                content_type
            )));
        };

        if !validate_magic_bytes(data, content_type) {
            return Err(AppError::Validation(
                "File content does not match declared content type".to_string(),
            ));
        }

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let dir = Path::new(&config.upload_dir).join(POST_IMAGES_DIR);

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create upload directory: {}", e))?;

        fs::write(dir.join(&filename), data)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write upload: {}", e))?;

        tracing::debug!(file = %filename, size = data.len(), "Stored post image");
        Ok(format!(
            "{}/{}/{}",
            UploadConfig::PUBLIC_PREFIX,
            POST_IMAGES_DIR,
            filename
        ))
    }
}
