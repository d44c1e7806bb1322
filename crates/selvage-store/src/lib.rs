//! object storage for selvage.
//!
//! model payloads live at `models/{id}`, archived pattern batches at
//! `patterns/{licenseKey}/{millis}`. every object carries a small
//! string-to-string metadata map in a json sidecar next to the payload.
//!
//! the filesystem backend is the only one shipped. the trait exists so a
//! bucket-backed store can slot in without touching the handlers.

#![warn(missing_docs)]

mod error;

pub use error::Error;

use std::collections::BTreeMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// result type for object store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// object metadata, stored alongside the payload.
///
/// keys and values are plain strings, matching what bucket stores allow.
pub type Metadata = BTreeMap<String, String>;

/// a stored object: payload bytes plus its metadata map.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// raw payload bytes
    pub data: Vec<u8>,

    /// metadata recorded at write time; empty if the sidecar is missing
    pub metadata: Metadata,
}

/// object store trait for opaque payloads addressed by slash-separated keys.
pub trait ObjectStore: Send + Sync {
    /// write an object and its metadata, replacing any previous version.
    fn put(
        &self,
        key: &str,
        data: &[u8],
        metadata: &Metadata,
    ) -> impl Future<Output = Result<()>> + Send;

    /// read an object. returns `None` if no payload exists at `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<StoredObject>>> + Send;

    /// true if a payload exists at `key`.
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;
}

/// filesystem-backed object store rooted at a directory.
///
/// keys map directly to paths under the root; metadata lives in a
/// `<leaf>.meta.json` sidecar in the same directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

const SIDECAR_SUFFIX: &str = ".meta.json";

impl FsObjectStore {
    /// create a store rooted at `root`. the directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// resolve a key to a payload path, rejecting traversal and odd segments.
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            validate_segment(key, segment)?;
            path.push(segment);
        }
        Ok(path)
    }

    fn sidecar_path(payload: &Path) -> PathBuf {
        let mut name = payload
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.push_str(SIDECAR_SUFFIX);
        payload.with_file_name(name)
    }
}

/// keys are built from license keys, model ids, and millisecond timestamps;
/// anything outside that alphabet is refused rather than escaped.
fn validate_segment(key: &str, segment: &str) -> Result<()> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(Error::InvalidKey(key.to_string()));
    }
    if !segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(Error::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, data: &[u8], metadata: &Metadata) -> Result<()> {
        let payload = self.object_path(key)?;
        if let Some(parent) = payload.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // sidecar first: a readable payload implies its metadata was written
        let sidecar = Self::sidecar_path(&payload);
        let encoded = serde_json::to_vec(metadata)?;
        tokio::fs::write(&sidecar, encoded).await?;
        tokio::fs::write(&payload, data).await?;

        tracing::debug!(key, bytes = data.len(), "stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        let payload = self.object_path(key)?;
        let data = match tokio::fs::read(&payload).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let metadata = match tokio::fs::read(Self::sidecar_path(&payload)).await {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "unreadable metadata sidecar, treating as empty");
                Metadata::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Metadata::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(StoredObject { data, metadata }))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let payload = self.object_path(key)?;
        Ok(tokio::fs::try_exists(&payload).await?)
    }
}
