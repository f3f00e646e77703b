//! In-Memory Artifact Store

use crate::{ArtifactStore, StorageError};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Artifact store kept in memory (tests and ephemeral deployments)
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts
    pub fn len(&self) -> usize {
        self.artifacts.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let mut artifacts = self.artifacts.lock().map_err(|e| StorageError::Io {
            path: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, format!("Lock error: {}", e)),
        })?;
        artifacts.insert(key.to_string(), bytes.to_vec());
        debug!("Stored in-memory artifact {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let artifacts = self.artifacts.lock().map_err(|e| StorageError::Io {
            path: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, format!("Lock error: {}", e)),
        })?;
        artifacts
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn exists(&self, key: &str) -> bool {
        self.artifacts
            .lock()
            .map(|a| a.contains_key(key))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_replace() {
        let store = MemoryArtifactStore::new();
        assert!(store.is_empty());

        store.put("a", b"first").unwrap();
        store.put("a", b"second").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap(), b"second".to_vec());
    }

    #[test]
    fn test_missing() {
        let store = MemoryArtifactStore::new();
        assert!(!store.exists("a"));
        assert!(matches!(store.get("a"), Err(StorageError::NotFound(_))));
        assert!(matches!(store.put("", b"x"), Err(StorageError::InvalidKey(_))));
    }
}
