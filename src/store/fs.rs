//! Read-only filesystem object store.
//!
//! Serves objects from a local directory so the gateway binary can run
//! without a remote store. Keys map directly to paths under the root; key
//! validation (no `..` segments) happens before any call reaches here.

use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::{BodyStream, ObjectMetadata, ObjectStore, StoreError};

const CHUNK_SIZE: usize = 64 * 1024;

/// Filesystem-backed object store rooted at a directory.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    async fn open(&self, key: &str) -> Result<File, StoreError> {
        match File::open(self.path_for(key)).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }
}

/// Weak etag from mtime and length, in the style of file servers.
fn fs_etag(meta: &std::fs::Metadata) -> Option<String> {
    let mtime = meta
        .modified()
        .ok()?
        .duration_since(UNIX_EPOCH)
        .ok()?
        .as_secs();
    Some(format!("\"{:x}-{:x}\"", mtime, meta.len()))
}

/// Stream a file in fixed-size chunks until `remaining` bytes have been read.
fn chunked_stream(file: File, remaining: u64) -> BodyStream {
    stream::try_unfold((file, remaining), |(mut file, remaining)| async move {
        if remaining == 0 {
            return Ok(None);
        }
        let want = CHUNK_SIZE.min(remaining as usize);
        let mut buf = vec![0u8; want];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            // File shrank underneath us; end the stream at what we have.
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some((Bytes::from(buf), (file, remaining - n as u64))))
    })
    .boxed()
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn metadata(&self, key: &str) -> Result<Option<ObjectMetadata>, StoreError> {
        match tokio::fs::metadata(self.path_for(key)).await {
            Ok(meta) if meta.is_file() => Ok(Some(ObjectMetadata {
                size: meta.len(),
                content_type: None,
                etag: fs_etag(&meta),
            })),
            // Directories are not objects.
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    async fn body(&self, key: &str) -> Result<BodyStream, StoreError> {
        let file = self.open(key).await?;
        let len = file
            .metadata()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .len();
        Ok(chunked_stream(file, len))
    }

    async fn body_range(&self, key: &str, start: u64, end: u64) -> Result<BodyStream, StoreError> {
        let mut file = self.open(key).await?;
        file.seek(SeekFrom::Start(start))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(chunked_stream(file, end - start + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    fn store_with(key: &str, data: &[u8]) -> (tempdir::TempDirGuard, FsObjectStore) {
        let dir = tempdir::TempDirGuard::new();
        let path = dir.path().join(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, data).unwrap();
        let store = FsObjectStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    // Minimal scoped temp dir so the tests leave nothing behind.
    mod tempdir {
        use std::path::{Path, PathBuf};

        pub struct TempDirGuard(PathBuf);

        static NEXT: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

        impl TempDirGuard {
            pub fn new() -> Self {
                let n = NEXT.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                let path = std::env::temp_dir().join(format!(
                    "object-gateway-test-{}-{}",
                    std::process::id(),
                    n
                ));
                std::fs::create_dir_all(&path).unwrap();
                Self(path)
            }

            pub fn path(&self) -> &Path {
                &self.0
            }
        }

        impl Drop for TempDirGuard {
            fn drop(&mut self) {
                let _ = std::fs::remove_dir_all(&self.0);
            }
        }
    }

    #[tokio::test]
    async fn serves_metadata_and_full_body() {
        let (_dir, store) = store_with("docs/note.txt", b"file contents");

        let meta = store.metadata("docs/note.txt").await.unwrap().unwrap();
        assert_eq!(meta.size, 13);
        assert!(meta.etag.is_some());
        assert!(meta.content_type.is_none());

        let chunks: Vec<Bytes> = store
            .body("docs/note.txt")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"file contents");
    }

    #[tokio::test]
    async fn serves_an_inclusive_range() {
        let (_dir, store) = store_with("blob.bin", b"0123456789");

        let chunks: Vec<Bytes> = store
            .body_range("blob.bin", 3, 7)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"34567");
    }

    #[tokio::test]
    async fn missing_keys_and_directories_are_absent() {
        let (_dir, store) = store_with("present/file.txt", b"x");

        assert!(store.metadata("absent.txt").await.unwrap().is_none());
        assert!(store.metadata("present").await.unwrap().is_none());
        assert!(matches!(store.body("absent.txt").await, Err(StoreError::NotFound)));
    }
}
