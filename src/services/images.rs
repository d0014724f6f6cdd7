//! Local storage for uploaded movie and TV show images
//!
//! Files land in the configured images directory and are served statically
//! under [PUBLIC_PREFIX]; items store the public path.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::error::{ApiError, ApiResult};

/// URL prefix the images directory is mounted under
pub const PUBLIC_PREFIX: &str = "/images";

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an uploaded image and return its public path
    ///
    /// The bytes must be a recognised image format; the file name is derived
    /// from the upload's name, sanitized and made unique.
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> ApiResult<String> {
        let kind = infer::get(bytes)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .ok_or_else(|| ApiError::validation("Uploaded file is not a supported image"))?;

        let file_name = unique_file_name(original_name, kind.extension());

        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create images directory {}", self.root.display()))?;
        tokio::fs::write(self.root.join(&file_name), bytes)
            .await
            .with_context(|| format!("Failed to write image {file_name}"))?;

        tracing::info!(file = %file_name, mime = kind.mime_type(), size = bytes.len(), "Image stored");
        Ok(format!("{PUBLIC_PREFIX}/{file_name}"))
    }

    /// Delete a previously stored image; missing files are ignored
    pub async fn remove(&self, public_path: &str) {
        let Some(file_name) = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|rest| Path::new(rest).file_name())
        else {
            return;
        };

        let path = self.root.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Image removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove image"),
        }
    }
}

fn unique_file_name(original_name: Option<&str>, extension: &str) -> String {
    let stem = original_name
        .map(|name| {
            Path::new(name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string()
        })
        .map(|stem| sanitize_filename::sanitize(stem).replace(' ', "_"))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "image".to_string());

    format!("{}_{stem}.{extension}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// Smallest header `infer` recognises as PNG
    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("images"));

        let public = store.save(Some("../poster of heat.png"), PNG).await.unwrap();
        assert!(public.starts_with("/images/"));
        assert!(public.ends_with("_poster_of_heat.png"));

        let file_name = public.trim_start_matches("/images/");
        let stored = store.root().join(file_name);
        assert_eq!(std::fs::read(&stored).unwrap(), PNG);

        store.remove(&public).await;
        assert!(!stored.exists());
        // second removal is a no-op
        store.remove(&public).await;
    }

    #[tokio::test]
    async fn test_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert_matches!(
            store.save(Some("notes.png"), b"plain text").await,
            Err(ApiError::Validation(_))
        );
    }

    #[test]
    fn test_file_names_are_unique_and_safe() {
        let a = unique_file_name(Some("a/b\\c:d.jpg"), "jpg");
        let b = unique_file_name(Some("a/b\\c:d.jpg"), "jpg");
        assert_ne!(a, b);
        assert!(!a.contains('/') && !a.contains('\\') && !a.contains(':'));
        assert!(unique_file_name(None, "png").ends_with("_image.png"));
    }

    #[tokio::test]
    async fn test_remove_ignores_foreign_paths() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"x").unwrap();
        let store = ImageStore::new(dir.path().join("images"));

        store.remove("/etc/keep.txt").await;
        store.remove("").await;
        assert!(outside.exists());
    }
}
