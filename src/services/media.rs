//! Media storage for uploaded files.
//!
//! Uploads land under the media root in per-collection directories
//! (`business_images/`, `profiles/`, ...) with generated file names. The
//! API stores and returns the relative path; serving the files is left to a
//! reverse proxy.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Allowed image extensions for gallery and profile uploads.
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store image bytes under `collection/`, returning the relative path.
    pub async fn store_image(
        &self,
        collection: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let ext = image_extension(original_name)
            .context("Unsupported image type")?;

        let relative = format!("{}/{}.{}", collection, Uuid::new_v4(), ext);
        let full = self.root.join(&relative);

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create media directory")?;
        }

        tokio::fs::write(&full, bytes)
            .await
            .context("Failed to write uploaded file")?;

        Ok(relative)
    }

    /// Best-effort removal of a previously stored file.
    pub async fn remove(&self, relative_path: &str) {
        // Refuse anything that could escape the media root.
        if relative_path.contains("..") || Path::new(relative_path).is_absolute() {
            tracing::warn!(path = relative_path, "Refusing to remove suspicious media path");
            return;
        }

        let full = self.root.join(relative_path);
        if let Err(e) = tokio::fs::remove_file(&full).await {
            tracing::warn!(path = relative_path, error = %e, "Failed to remove media file");
        }
    }
}

/// Extract and validate the image extension from an uploaded file name.
pub fn image_extension(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|&&allowed| allowed == ext)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_image_extensions() {
        assert_eq!(image_extension("photo.JPG"), Some("jpg"));
        assert_eq!(image_extension("scan.jpeg"), Some("jpeg"));
        assert_eq!(image_extension("logo.png"), Some("png"));
        assert_eq!(image_extension("pano.webp"), Some("webp"));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(image_extension("document.pdf"), None);
        assert_eq!(image_extension("script.sh"), None);
        assert_eq!(image_extension("no_extension"), None);
        assert_eq!(image_extension(""), None);
    }

    #[tokio::test]
    async fn stores_and_removes_files_under_the_root() {
        let dir = std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4()));
        let store = MediaStore::new(&dir);

        let path = store
            .store_image("business_images", "hotel.jpg", b"fake-bytes")
            .await
            .unwrap();
        assert!(path.starts_with("business_images/"));
        assert!(path.ends_with(".jpg"));
        assert!(dir.join(&path).exists());

        store.remove(&path).await;
        assert!(!dir.join(&path).exists());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn remove_ignores_path_traversal() {
        let dir = std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4()));
        let store = MediaStore::new(&dir);
        // must not panic or touch anything outside the root
        store.remove("../../etc/passwd").await;
        store.remove("/etc/passwd").await;
    }
}
