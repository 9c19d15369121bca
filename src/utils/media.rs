use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::AppError;

/// Accepted image types and the file extension stored for each.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Object storage for post images: put bytes, get back a durable public URL.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError>;
}

/// Checks size and type before any bytes leave the caller.
/// Returns the file extension for the content type.
pub fn check_upload(len: usize, content_type: &str, max_bytes: usize) -> Result<&'static str, AppError> {
    if len == 0 {
        return Err(AppError::Upload("file is empty".to_string()));
    }
    if len > max_bytes {
        return Err(AppError::Upload(format!(
            "file exceeds {} bytes",
            max_bytes
        )));
    }
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| AppError::Upload(format!("unsupported content type '{}'", content_type)))
}

/// Writes uploads to a local directory that is served under `base_url`.
#[derive(Debug, Clone)]
pub struct LocalMediaUploader {
    dir: PathBuf,
    base_url: String,
    max_bytes: usize,
}

impl LocalMediaUploader {
    pub fn new(dir: impl Into<PathBuf>, base_url: &str, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }
}

#[async_trait]
impl MediaUploader for LocalMediaUploader {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        let ext = check_upload(bytes.len(), content_type, self.max_bytes)?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            tracing::error!("Failed to create media dir {:?}: {:?}", self.dir, e);
            AppError::Transient(e.to_string())
        })?;

        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            tracing::error!("Failed to write upload {:?}: {:?}", path, e);
            AppError::Transient(e.to_string())
        })?;

        tracing::debug!("Stored {} bytes at {:?}", bytes.len(), path);
        Ok(format!("{}/{}", self.base_url, file_name))
    }
}
