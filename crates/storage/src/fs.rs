//! Filesystem Artifact Store

use crate::{ArtifactStore, StorageError};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Artifact store rooted at a directory; keys are relative file paths
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Split a file path into a store over its directory and the file name key
    pub fn locate(path: impl AsRef<Path>) -> Result<(Self, String), StorageError> {
        let path = path.as_ref();
        let key = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidKey(path.display().to_string()))?
            .to_string();
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((Self::new(root), key))
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a file path, rejecting keys that escape the root
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let parent = path.parent().unwrap_or(self.root.as_path());
        std::fs::create_dir_all(parent).map_err(|e| Self::io_error(parent, e))?;

        // Uniquely named sibling temp file, renamed over the target
        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| Self::io_error(parent, e))?;
        tmp.write_all(bytes).map_err(|e| Self::io_error(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| Self::io_error(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| Self::io_error(&path, e.error))?;

        info!("Stored artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(&path).map_err(|e| Self::io_error(&path, e))?;
        debug!("Read artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(bytes)
    }

    fn exists(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }
}
