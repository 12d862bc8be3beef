use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// `data:image/png;base64,...` payloads sent by the campaign editor.
static DATA_URI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/(\w+);base64,(.+)$").unwrap());

/// Image types accepted for logo and campaign uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// On-disk image storage for party logos and campaign art.
///
/// Files land under `{root}/{subdir}/` and are referred to everywhere
/// else by their root-relative path (`campaigns/campaign_<id>.png`).
/// Absolute URLs are only produced at the API boundary.
pub struct FileStorage {
    root: PathBuf,
    base_url: String,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn allowed_extension(ext: &str) -> bool {
        let lower = ext.to_ascii_lowercase();
        ALLOWED_EXTENSIONS.contains(&lower.as_str())
    }

    /// Extension of an uploaded filename, lowercased.
    pub fn extension_of(filename: &str) -> Option<String> {
        filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Persist raw image bytes and return the root-relative path.
    pub async fn save_image(
        &self,
        subdir: &str,
        prefix: &str,
        ext: &str,
        bytes: &[u8],
    ) -> ApiResult<String> {
        let ext = ext.to_ascii_lowercase();
        if !Self::allowed_extension(&ext) {
            return Err(ApiError::Validation(format!("Invalid image type: {}", ext)));
        }

        let dir = self.root.join(subdir);
        fs::create_dir_all(&dir).await?;

        let filename = format!("{}_{}.{}", prefix, Uuid::new_v4().simple(), ext);
        fs::write(dir.join(&filename), bytes).await?;
        tracing::debug!("Stored {} image at {}/{}", prefix, subdir, filename);

        Ok(format!("{}/{}", subdir, filename))
    }

    /// Decode a base64 data URI and persist it like a plain upload.
    pub async fn save_data_uri(
        &self,
        subdir: &str,
        prefix: &str,
        data_uri: &str,
    ) -> ApiResult<String> {
        let captures = DATA_URI_PATTERN
            .captures(data_uri)
            .ok_or_else(|| ApiError::Validation("Invalid image data format".to_string()))?;

        let ext = captures[1].to_string();
        let bytes = BASE64
            .decode(captures[2].as_bytes())
            .map_err(|_| ApiError::Validation("Invalid base64 image data".to_string()))?;

        self.save_image(subdir, prefix, &ext, &bytes).await
    }

    /// Remove a stored file. Missing files are logged and ignored so a
    /// stale reference never blocks the update that replaces it.
    pub async fn delete(&self, rel_path: &str) {
        let path = self.root.join(rel_path);
        match fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("Deleted stored file {}", rel_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Stored file {} already gone", rel_path);
            }
            Err(e) => tracing::warn!("Failed to delete stored file {}: {}", rel_path, e),
        }
    }

    pub fn public_url(&self, rel_path: &str) -> String {
        format!("{}/uploads/{}", self.base_url, rel_path)
    }

    /// Rewrites a stored relative path into an absolute URL. Values that
    /// are empty, already absolute, or emoji placeholders pass through
    /// untouched.
    pub fn absolutize(&self, value: &str) -> String {
        if Self::is_stored_path(value) {
            self.public_url(value)
        } else {
            value.to_string()
        }
    }

    /// A stored path is non-empty, carries no URL scheme, and contains a
    /// path separator. Emoji placeholders fail the separator test.
    pub fn is_stored_path(value: &str) -> bool {
        !value.is_empty() && !value.starts_with("http") && value.contains('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};

    fn storage_at(dir: &std::path::Path) -> FileStorage {
        FileStorage::new(dir.to_path_buf(), "http://localhost:5000/")
    }

    #[tokio::test]
    async fn save_image_writes_bytes_under_subdir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(dir.path());

        let rel = storage
            .save_image("campaigns", "campaign", "png", b"fake png bytes")
            .await
            .unwrap();

        assert!(rel.starts_with("campaigns/campaign_"));
        assert!(rel.ends_with(".png"));

        let on_disk = std::fs::read(dir.path().join(&rel)).unwrap();
        assert_eq!(on_disk, b"fake png bytes");
    }

    #[tokio::test]
    async fn save_image_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(dir.path());

        let err = storage
            .save_image("campaigns", "campaign", "exe", b"nope")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn save_data_uri_decodes_payload() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(dir.path());

        let payload = STANDARD.encode(b"jpeg body");
        let rel = storage
            .save_data_uri("campaigns", "campaign", &format!("data:image/jpeg;base64,{}", payload))
            .await
            .unwrap();

        assert!(rel.ends_with(".jpeg"));
        let on_disk = std::fs::read(dir.path().join(&rel)).unwrap();
        assert_eq!(on_disk, b"jpeg body");
    }

    #[tokio::test]
    async fn save_data_uri_rejects_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(dir.path());

        let err = storage
            .save_data_uri("campaigns", "campaign", "data:text/plain;base64,aGVsbG8=")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = storage
            .save_data_uri("campaigns", "campaign", "data:image/png;base64,!!!not-base64!!!")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_is_quiet_for_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(dir.path());

        // Should not panic or error.
        storage.delete("campaigns/never_existed.png").await;
    }

    #[test]
    fn absolutize_rewrites_only_stored_paths() {
        let storage = FileStorage::new("/tmp/uploads", "http://localhost:5000");

        assert_eq!(
            storage.absolutize("campaigns/campaign_abc.png"),
            "http://localhost:5000/uploads/campaigns/campaign_abc.png"
        );
        assert_eq!(storage.absolutize("🎯"), "🎯");
        assert_eq!(storage.absolutize(""), "");
        assert_eq!(
            storage.absolutize("https://cdn.example.com/logo.png"),
            "https://cdn.example.com/logo.png"
        );
        assert_eq!(
            storage.absolutize("http://cdn.example.com/logo.png"),
            "http://cdn.example.com/logo.png"
        );
    }

    #[test]
    fn extension_parsing_is_case_insensitive() {
        assert_eq!(FileStorage::extension_of("photo.PNG"), Some("png".to_string()));
        assert_eq!(FileStorage::extension_of("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(FileStorage::extension_of("no-extension"), None);
        assert!(FileStorage::allowed_extension("JPEG"));
        assert!(!FileStorage::allowed_extension("svg"));
    }
}
