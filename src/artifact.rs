//! Temporary artifact storage for uploaded payloads
//!
//! Each upload lands in its own file named by a random 16-character id.
//! The returned [`Artifact`] owns that file and removes it when dropped,
//! unless the store was configured to retain artifacts.

use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::{debug, warn};

/// Length of a generated artifact id
pub const ARTIFACT_ID_LEN: usize = 16;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create artifact directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Generate an artifact id.
///
/// Characters are drawn without replacement from the 62 ASCII letters and
/// digits, so no character repeats within one id. Ids are not globally
/// unique; two requests may collide and the later write wins.
pub fn generate_artifact_id() -> String {
    let mut rng = rand::rng();
    ALPHABET
        .choose_multiple(&mut rng, ARTIFACT_ID_LEN)
        .map(|&b| b as char)
        .collect()
}

/// A stored payload, removed from disk on drop unless retained
#[derive(Debug)]
pub struct Artifact {
    id: String,
    path: PathBuf,
    len: usize,
    retain: bool,
}

impl Artifact {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if self.retain {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed artifact {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove artifact {}: {}", self.path.display(), e),
        }
    }
}

/// Writes payloads into a directory under generated ids
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    retain: bool,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            retain: false,
        }
    }

    /// Keep artifact files after the request that created them
    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn retains(&self) -> bool {
        self.retain
    }

    /// Persist `payload` under a fresh id and return the owning handle.
    ///
    /// An existing file with the same id is overwritten.
    pub async fn store(&self, payload: &[u8]) -> Result<Artifact, StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;

        let id = generate_artifact_id();
        let path = self.dir.join(&id);

        tokio::fs::write(&path, payload)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        debug!("Stored {} bytes at {}", payload.len(), path.display());

        Ok(Artifact {
            id,
            path,
            len: payload.len(),
            retain: self.retain,
        })
    }
}
