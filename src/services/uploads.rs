use std::path::PathBuf;

use chrono::Utc;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::error::{AppError, Result};

/// Public URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Reported when an upload exceeds the configured size cap.
pub const FILE_TOO_LARGE_MESSAGE: &str = "파일 크기가 너무 큽니다.";

/// Image types accepted as profile photos.
const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// How many timestamps to try before giving up on a free file name.
const MAX_NAME_ATTEMPTS: i64 = 8;

/// A file written by [`UploadStore::save`].
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// `<unix_ms>-<original name>`.
    pub file_name: String,
    /// Location on disk.
    pub path: PathBuf,
    /// Path clients fetch the file from.
    pub public_url: String,
    /// Sniffed content type.
    pub mime_type: &'static str,
}

/// Writes uploaded files into a single directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: PathBuf, max_bytes: usize) -> Self {
        Self { dir, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Creates the upload directory if it is missing.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Validates and stores `bytes` under a timestamp-prefixed name.
    ///
    /// # Arguments
    ///
    /// * `original_name` - The file name the client sent, if any.
    /// * `bytes` - The file content.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `StoredFile`.
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<StoredFile> {
        if bytes.len() > self.max_bytes {
            return Err(AppError::Validation(FILE_TOO_LARGE_MESSAGE.to_string()));
        }

        let mime_type = detect_image(bytes)?;
        let safe_name = sanitize_file_name(original_name.unwrap_or_default());
        let base_ms = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = format!("{}-{}", base_ms + attempt, safe_name);
            let path = self.dir.join(&file_name);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = file.write_all(bytes).await {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(e.into());
            }
            file.flush().await?;

            tracing::info!("📁 Stored upload {} ({} bytes, {})", file_name, bytes.len(), mime_type);

            return Ok(StoredFile {
                public_url: format!("{}/{}", PUBLIC_PREFIX, file_name),
                file_name,
                path,
                mime_type,
            });
        }

        Err(AppError::Internal(format!(
            "No free upload name for {} after {} attempts",
            safe_name, MAX_NAME_ATTEMPTS
        )))
    }

    /// Removes a stored file, logging instead of failing.
    pub async fn discard(&self, stored: &StoredFile) {
        if let Err(e) = tokio::fs::remove_file(&stored.path).await {
            tracing::warn!("Could not remove upload {}: {}", stored.file_name, e);
        }
    }
}

/// Sniffs the content and accepts only the allowed image types.
pub fn detect_image(bytes: &[u8]) -> Result<&'static str> {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .filter(|mime| ALLOWED_MIME_TYPES.contains(mime))
        .ok_or_else(|| {
            AppError::Validation(
                "이미지 파일(JPEG, PNG, GIF, WEBP)만 업로드할 수 있습니다.".to_string(),
            )
        })
}

/// Reduces a client-supplied name to a safe final path component.
pub fn sanitize_file_name(original: &str) -> String {
    let last = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
