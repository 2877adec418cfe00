//! Key-addressed storage for uploaded product images.
//!
//! The service layer owns image lifetime: it stores new uploads, deletes
//! replaced ones, and records the returned key on the product row. Keys are
//! derived from file content, so re-uploading identical bytes yields the
//! same key and the second write is a no-op.

mod filesystem;

pub use filesystem::FilesystemImageStore;

use std::fmt;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Errors that can occur during image store operations.
#[derive(Debug)]
pub enum StorageError {
    /// The requested object was not found.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The upload exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "object not found: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "upload exceeds size limit ({actual} > {limit} bytes)")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Key-addressed store for uploaded image files.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under a content-derived key and return the key.
    ///
    /// Storing identical content twice returns the same key without
    /// rewriting the object.
    async fn put(&self, filename: &str, bytes: &[u8]) -> Result<String, StorageError>;

    /// Remove the object at `key`.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Read back all bytes of the object at `key`.
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

/// Derive the storage key for an upload: hex SHA-256 of the content with
/// the original file extension appended, so the key stays a plausible
/// filename for downstream consumers.
pub fn image_key(filename: &str, bytes: &[u8]) -> String {
    let hash = hex::encode(Sha256::digest(bytes));
    match std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) if !ext.is_empty() => format!("{hash}.{}", ext.to_ascii_lowercase()),
        _ => hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_content_hash_with_extension() {
        let key = image_key("shirt.PNG", b"hello");
        assert!(key.ends_with(".png"));
        assert_eq!(key.len(), 64 + 4);
        // Same content, different upload name but same extension: same key.
        assert_eq!(key, image_key("other.png", b"hello"));
    }

    #[test]
    fn key_without_extension_is_bare_hash() {
        let key = image_key("noext", b"hello");
        assert_eq!(key.len(), 64);
    }

    #[test]
    fn different_content_yields_different_keys() {
        assert_ne!(image_key("a.jpg", b"one"), image_key("a.jpg", b"two"));
    }
}
