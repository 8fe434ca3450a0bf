//! Snapshot loading service
//!
//! Reads stored `{ "cards": [...], "edges": [...] }` documents and turns them
//! into validated domain snapshots.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Snapshot, SnapshotDocument};
use crate::infrastructure::traits::FileSystem;

/// Service for reading card/edge snapshots.
pub struct SnapshotService {
    fs: Arc<dyn FileSystem>,
}

impl SnapshotService {
    /// Create a new snapshot service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load and validate a snapshot file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Snapshot> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::SnapshotNotFound(path.to_path_buf()));
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::SnapshotFormat {
                path: path.to_path_buf(),
                message: "not a regular file".into(),
            });
        }
        let text = self
            .fs
            .read_to_string(path)
            .with_path_context("read snapshot", path)?;
        let snapshot = Self::parse_document(&text).map_err(|message| {
            ApplicationError::SnapshotFormat {
                path: path.to_path_buf(),
                message,
            }
        })?;
        let snapshot = Snapshot::try_from(snapshot)?;
        debug!(
            "loaded {} cards, {} edges from {}",
            snapshot.cards().len(),
            snapshot.edges().len(),
            path.display()
        );
        Ok(snapshot)
    }

    /// Parse snapshot text that did not come from a file.
    pub fn parse(text: &str) -> ApplicationResult<Snapshot> {
        let doc = Self::parse_document(text).map_err(|message| ApplicationError::SnapshotFormat {
            path: "<inline>".into(),
            message,
        })?;
        Ok(Snapshot::try_from(doc)?)
    }

    fn parse_document(text: &str) -> Result<SnapshotDocument, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }
}
