//! Storage Layer
//!
//! Key-by-path persistence for serialized model artifacts. Writes replace the
//! previous artifact atomically so a reader never sees a partial file.

mod fs;
mod memory;

pub use fs::FsArtifactStore;
pub use memory::MemoryArtifactStore;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Artifact not found: {0}")]
    NotFound(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid artifact key: {0}")]
    InvalidKey(String),
}

/// Byte-level store for model artifacts addressed by key
pub trait ArtifactStore: Send + Sync {
    /// Store bytes under `key`, replacing any previous value
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Fetch the bytes stored under `key`
    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Whether `key` holds a value
    fn exists(&self, key: &str) -> bool;
}
