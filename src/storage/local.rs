use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::config::StorageConfig;
use crate::error::{AppError, Result};
use crate::storage::DocumentStorage;

/// Documents kept on the local filesystem under `<root>/<bucket>`, published
/// by the router at `/storage/<bucket>`.
pub struct LocalDocumentStorage {
    bucket_dir: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalDocumentStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            bucket_dir: Path::new(&config.root).join(&config.bucket),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Map a bucket-relative path onto the filesystem, refusing anything that
    /// could leave the bucket.
    fn object_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_plain {
            return Err(AppError::Storage(format!("Invalid object path: {}", path)));
        }

        Ok(self.bucket_dir.join(relative))
    }
}

#[async_trait]
impl DocumentStorage for LocalDocumentStorage {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        let file_path = self.object_path(path)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create directory: {}", e))
            })?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    AppError::Storage(format!("Object already exists: {}", path))
                }
                _ => AppError::Storage(format!("Failed to create file: {}", e)),
            })?;

        file.write_all(data).await.map_err(|e| {
            AppError::Storage(format!("Failed to write file: {}", e))
        })?;
        file.flush().await.map_err(|e| {
            AppError::Storage(format!("Failed to write file: {}", e))
        })?;

        tracing::debug!("Stored document {} ({} bytes)", path, data.len());
        Ok(path.to_string())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let file_path = self.object_path(path)?;

        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {}", e))),
        }
    }

    fn public_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();

        format!("{}/{}/{}", self.public_base_url, self.bucket, encoded.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentRef;

    fn storage(root: &Path) -> LocalDocumentStorage {
        LocalDocumentStorage::new(&StorageConfig {
            root: root.to_string_lossy().into_owned(),
            bucket: "documents".to_string(),
            public_base_url: "http://localhost:8080/storage/".to_string(),
        })
    }

    #[tokio::test]
    async fn upload_writes_under_bucket_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let stored = storage.upload("photos/MJBEA242500001.png", b"png").await.unwrap();
        assert_eq!(stored, "photos/MJBEA242500001.png");

        let on_disk = dir.path().join("documents/photos/MJBEA242500001.png");
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"png");

        let again = storage.upload("photos/MJBEA242500001.png", b"other").await;
        assert!(matches!(again, Err(AppError::Storage(_))));
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"png");

        storage.delete("photos/MJBEA242500001.png").await.unwrap();
        assert!(!on_disk.exists());
        storage.delete("photos/MJBEA242500001.png").await.unwrap();
    }

    #[tokio::test]
    async fn paths_cannot_escape_the_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        for path in ["../secret.txt", "/etc/passwd", "photos/../../x", ""] {
            assert!(storage.upload(path, b"x").await.is_err(), "{path}");
        }
    }

    #[test]
    fn public_urls_are_encoded_per_segment() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        assert_eq!(
            storage.public_url("photos/a b.png"),
            "http://localhost:8080/storage/documents/photos/a%20b.png"
        );
    }

    #[test]
    fn resolve_skips_placeholders_and_keeps_absolute_urls() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        assert_eq!(storage.resolve(&DocumentRef::Missing), None);
        assert_eq!(storage.resolve(&DocumentRef::placeholder_for("photos/x.png")), None);
        assert_eq!(
            storage.resolve(&DocumentRef::Url("https://cdn.example.com/p.png".to_string())).as_deref(),
            Some("https://cdn.example.com/p.png")
        );
        assert_eq!(
            storage.resolve(&DocumentRef::Stored("photos/x.png".to_string())).as_deref(),
            Some("http://localhost:8080/storage/documents/photos/x.png")
        );
    }
}
