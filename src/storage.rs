use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use axum::body::Bytes;
use uuid::Uuid;

/// Public URL prefix the content directory is served under.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

const MAX_EXTENSION_LEN: usize = 10;

/// StorageError
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// StorageService
///
/// Persists uploaded files and hands back the relative URL path they are served at.
/// Files are never removed: replacing or deleting the owning document leaves the old
/// file in place.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Prepares the backing store. Called once at startup.
    async fn ensure_ready(&self) -> Result<(), StorageError>;

    /// Stores `bytes` under a generated unique name and returns `/uploads/<name>`.
    /// Only the extension of `original_name` is kept.
    async fn save(&self, original_name: Option<&str>, bytes: Bytes) -> Result<String, StorageError>;
}

pub type StorageState = Arc<dyn StorageService>;

/// LocalDiskStorage
///
/// Writes uploads into the configured content directory.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl StorageService for LocalDiskStorage {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn save(&self, original_name: Option<&str>, bytes: Bytes) -> Result<String, StorageError> {
        let name = generated_name(original_name);
        tokio::fs::write(self.root.join(&name), &bytes).await?;
        tracing::debug!(file = %name, size = bytes.len(), "upload stored");
        Ok(public_path(&name))
    }
}

/// sanitize_extension
///
/// Reduces a client-supplied filename to a safe lowercase extension (with its dot), or
/// nothing when the name has no usable one. Directory components never survive.
pub fn sanitize_extension(original_name: Option<&str>) -> String {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ext.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|ext| !ext.is_empty() && ext.len() <= MAX_EXTENSION_LEN);

    match ext {
        Some(ext) => format!(".{ext}"),
        None => String::new(),
    }
}

fn generated_name(original_name: Option<&str>) -> String {
    format!("{}{}", Uuid::new_v4(), sanitize_extension(original_name))
}

fn public_path(name: &str) -> String {
    format!("{UPLOAD_URL_PREFIX}/{name}")
}

/// MockStorageService
///
/// Test double that keeps nothing but still returns well-formed paths. With
/// `should_fail` set every save reports the store as unavailable.
#[derive(Debug, Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn save(&self, original_name: Option<&str>, _bytes: Bytes) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Unavailable("simulated failure".to_string()));
        }
        Ok(public_path(&generated_name(original_name)))
    }
}
