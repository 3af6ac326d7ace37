//! Snapshot persistence.
//!
//! State is serialized as one JSON document holding two arrays under fixed
//! keys: `users` and `bookings`. The whole document is read once at startup
//! and rewritten after every mutation. A missing file means a fresh install;
//! a malformed file is fatal, there is no fallback store to substitute.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{Booking, User};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub bookings: Vec<Booking>,
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` means no prior state exists.
    async fn load(&self) -> Result<Option<Snapshot>>;

    async fn persist(&self, snapshot: &Snapshot) -> Result<()>;
}

/// File-backed store. Writes go to a sibling temp file first so a crash
/// mid-write never leaves a truncated snapshot behind.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Snapshot>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let snapshot = serde_json::from_slice(&bytes).with_context(|| {
                    format!("malformed snapshot at {}", self.path.display())
                })?;
                Ok(Some(snapshot))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("failed to read snapshot at {}", self.path.display())
            }),
        }
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("failed to create snapshot directory")?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .context("failed to write snapshot temp file")?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .context("failed to move snapshot into place")?;

        Ok(())
    }
}

/// Keeps nothing across restarts. Used by unit tests and anywhere a
/// throwaway instance is acceptable.
#[derive(Debug, Default)]
pub struct InMemoryStore;

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn load(&self) -> Result<Option<Snapshot>> {
        Ok(None)
    }

    async fn persist(&self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }
}
