//! Persisted identity: a single `IdentityRecord` on disk.
//!
//! Persisted as `{data_dir}/identity.json`.
//! Written through a temp file + rename so a reader never sees a torn record.
//! The temp file is synced before the rename, so a crash cannot leave an
//! empty identity file behind the rename.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::identity::IdentityRecord;
use crate::{ForumError, ForumResult};

#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored record. `Ok(None)` when the file does not exist.
    /// A file that exists but cannot be read or parsed is an error: it may
    /// hold an identity the server already knows, so it is never replaced.
    pub fn load(&self) -> ForumResult<Option<IdentityRecord>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ForumError::Identity(format!(
                    "Cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let record: IdentityRecord = serde_json::from_str(&content).map_err(|e| {
            ForumError::Identity(format!("Corrupt identity file {}: {}", self.path.display(), e))
        })?;
        if record.user_id.trim().is_empty() {
            return Err(ForumError::Identity(format!(
                "Identity file {} holds an empty user_id",
                self.path.display()
            )));
        }
        Ok(Some(record))
    }

    pub fn save(&self, record: &IdentityRecord) -> ForumResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        write_synced(&tmp, serde_json::to_string_pretty(record)?.as_bytes())?;
        std::fs::rename(&tmp, &self.path)?;
        sync_parent_dir(&self.path);
        tracing::debug!(path = %self.path.display(), "Identity saved");
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Make the rename itself durable. Best effort: not every platform can open a directory.
fn sync_parent_dir(path: &Path) {
    #[cfg(unix)]
    {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::File::open(parent).and_then(|dir| dir.sync_all()) {
                tracing::debug!(path = %parent.display(), error = %e, "Directory sync skipped");
            }
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}
