use std::env;

/// Where uploaded post images live on disk and the URL prefix they are
/// served under.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub upload_dir: String,
}

impl UploadConfig {
    pub const PUBLIC_PREFIX: &'static str = "/uploads";

    pub fn from_env() -> Self {
        Self {
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
        }
    }
}
