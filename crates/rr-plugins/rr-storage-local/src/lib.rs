//! # rr-storage-local
//! rusty-reddit/crates/rr-plugins/rr-storage-local/src/lib.rs
//! Local filesystem implementation of `MediaStore`.
//! Features: content-addressable storage, directory sharding, image validation.

use async_trait::async_trait;
use image::{ImageFormat, ImageReader};
use rr_core::error::{AppError, Result};
use rr_core::traits::MediaStore;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::PathBuf;
use tokio::fs;

/// Formats accepted for community images.
const ALLOWED: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif, ImageFormat::WebP];

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/media")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/media")
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self { root_path: root, url_prefix: url_prefix.trim_end_matches('/').to_string() }
    }

    /// Media ids look like "subreddits/ab/cd/abcd...ef.png".
    fn media_id(hash: &str, ext: &str) -> String {
        format!("subreddits/{}/{}/{}.{}", &hash[0..2], &hash[2..4], hash, ext)
    }
}

/// Sniffs the payload and decodes it fully; anything that is not a
/// well-formed image of an allowed format is rejected.
fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let format = reader
        .format()
        .filter(|f| ALLOWED.contains(f))
        .ok_or_else(|| AppError::ValidationError("image: Upload a valid image.".into()))?;
    reader.decode().map_err(|_| {
        AppError::ValidationError(
            "image: The file you uploaded was either not an image or a corrupted image.".into(),
        )
    })?;
    Ok(format)
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload using its SHA-256 hash as the filename.
    /// This automatically deduplicates files.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> Result<String> {
        // 1. Validate (full decode runs on the blocking pool)
        let (data, format) = tokio::task::spawn_blocking(move || {
            let format = detect_format(&data)?;
            Ok::<_, AppError>((data, format))
        })
        .await
        .map_err(|e| AppError::Internal(format!("image decode task: {e}")))??;
        if !content_type.starts_with("image/") {
            tracing::debug!(content_type, ?format, "content type disagrees with payload");
        }

        // 2. Calculate Hash
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = format!("{:x}", hasher.finalize());

        let ext = format.extensions_str().first().copied().unwrap_or("bin");
        let media_id = Self::media_id(&hash, ext);
        let target_path = self.root_path.join(&media_id);

        // 3. Ensure directory exists
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("media dir: {e}")))?;
        }

        // 4. Save original (if not exists)
        if !fs::try_exists(&target_path).await.unwrap_or(false) {
            fs::write(&target_path, &data)
                .await
                .map_err(|e| AppError::Internal(format!("media write: {e}")))?;
            tracing::info!(media_id = %media_id, bytes = data.len(), "stored upload");
        }

        Ok(media_id)
    }

    fn get_url(&self, media_id: &str) -> String {
        format!("{}/{}", self.url_prefix, media_id)
    }
}
