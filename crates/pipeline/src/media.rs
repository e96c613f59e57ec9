//! Blob transfer in and out of the job's local staging area.

use std::path::{Path, PathBuf};

/// Transfer failures are a distinct job outcome from analysis failures,
/// so they carry their own error type.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Fetching the source object failed.
    #[error("Failed to fetch '{key}': {source}")]
    Fetch {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Storing the output object failed.
    #[error("Failed to store '{key}': {source}")]
    Store {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Capability interface for the media store (S3-like object storage in
/// production, a directory on disk in tests and local runs).
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Download the object at `key` into the local file `dest`.
    async fn fetch(&self, key: &str, dest: &Path) -> Result<(), TransferError>;

    /// Upload the local file `src` under `key`, returning a URL that
    /// clients can retrieve the object from.
    async fn store(&self, src: &Path, key: &str) -> Result<String, TransferError>;
}

/// Filesystem-backed [`MediaStore`] rooted at a directory.
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait::async_trait]
impl MediaStore for FsMediaStore {
    async fn fetch(&self, key: &str, dest: &Path) -> Result<(), TransferError> {
        tokio::fs::copy(self.object_path(key), dest)
            .await
            .map_err(|source| TransferError::Fetch {
                key: key.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn store(&self, src: &Path, key: &str) -> Result<String, TransferError> {
        let dest = self.object_path(key);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| TransferError::Store {
                    key: key.to_string(),
                    source,
                })?;
        }
        tokio::fs::copy(src, &dest)
            .await
            .map_err(|source| TransferError::Store {
                key: key.to_string(),
                source,
            })?;
        Ok(format!("file://{}", dest.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn fetch_missing_key_is_a_fetch_error() {
        let dir = std::env::temp_dir().join("matchlens-media-test-missing");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let store = FsMediaStore::new(&dir);
        let result = store.fetch("does-not-exist", &dir.join("out")).await;
        assert_matches!(result, Err(TransferError::Fetch { .. }));
    }

    #[tokio::test]
    async fn store_then_fetch_round_trips() {
        let dir = std::env::temp_dir().join("matchlens-media-test-roundtrip");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let src = dir.join("src.json");
        tokio::fs::write(&src, b"{}").await.unwrap();

        let store = FsMediaStore::new(dir.join("objects"));
        let url = store.store(&src, "outputs/a.json").await.unwrap();
        assert!(url.starts_with("file://"));

        let dest = dir.join("fetched.json");
        store.fetch("outputs/a.json", &dest).await.unwrap();
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"{}");
    }
}
