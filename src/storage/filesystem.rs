use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::{image_key, ImageStore, StorageError};

/// Filesystem-backed image store.
///
/// Objects live flat under `base_dir`, named by their content-derived key.
/// Writes go through a temp file and a rename so a crash never leaves a
/// half-written object at a live key.
pub struct FilesystemImageStore {
    base_dir: PathBuf,
    max_size: u64,
}

impl FilesystemImageStore {
    /// Create a new store rooted at `base_dir`, creating it if needed.
    pub async fn new(base_dir: impl Into<PathBuf>, max_size: u64) -> Result<Self, StorageError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).await?;
        fs::create_dir_all(base_dir.join(".tmp")).await?;
        Ok(Self { base_dir, max_size })
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_dir.join(".tmp").join(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn put(&self, filename: &str, bytes: &[u8]) -> Result<String, StorageError> {
        if bytes.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: bytes.len() as u64,
                limit: self.max_size,
            });
        }

        let key = image_key(filename, bytes);
        let object_path = self.object_path(&key);

        // Content-addressed: an existing object at this key already holds
        // these exact bytes.
        if object_path.exists() {
            return Ok(key);
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.object_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.object_path(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.object_path(key)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (tempfile::TempDir, FilesystemImageStore) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = FilesystemImageStore::new(dir.path().join("products"), 1024)
            .await
            .expect("failed to create store");
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_read_round_trips() {
        let (_dir, store) = test_store().await;

        let key = store.put("shirt.png", b"fake image bytes").await.unwrap();
        assert!(store.exists(&key).await.unwrap());
        assert_eq!(store.read(&key).await.unwrap(), b"fake image bytes");
    }

    #[tokio::test]
    async fn put_identical_content_is_idempotent() {
        let (_dir, store) = test_store().await;

        let first = store.put("a.png", b"same").await.unwrap();
        let second = store.put("b.png", b"same").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn delete_reports_whether_object_existed() {
        let (_dir, store) = test_store().await;

        let key = store.put("a.png", b"bytes").await.unwrap();
        assert!(store.delete(&key).await.unwrap());
        assert!(!store.delete(&key).await.unwrap());
        assert!(!store.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn put_rejects_oversized_uploads() {
        let (_dir, store) = test_store().await;

        let big = vec![0u8; 2048];
        match store.put("big.png", &big).await {
            Err(StorageError::SizeLimitExceeded { actual, limit }) => {
                assert_eq!(actual, 2048);
                assert_eq!(limit, 1024);
            }
            other => panic!("expected size limit error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_missing_key_is_not_found() {
        let (_dir, store) = test_store().await;

        match store.read("does-not-exist.png").await {
            Err(StorageError::NotFound(key)) => assert_eq!(key, "does-not-exist.png"),
            other => panic!("expected not found, got {other:?}"),
        }
    }
}
