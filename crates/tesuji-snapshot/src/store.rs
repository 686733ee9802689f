//! The snapshot store: one overwritable JSON file per session key.
//!
//! Only the most recent interruption per key is kept; saving overwrites
//! whatever was there before. That is deliberate: resumption is offered
//! for "the game we were just playing", not a history browser.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tesuji_protocol::SessionKey;

use crate::{SnapshotError, SnapshotRecord, SCHEMA_VERSION};

/// Directory-backed snapshot storage.
pub struct SnapshotStore {
    dir: PathBuf,
    /// Last stamp handed out; save stamps are strictly increasing even if
    /// the wall clock stalls or steps backwards.
    stamp: AtomicU64,
}

impl SnapshotStore {
    /// Opens (creating if needed) a snapshot directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            stamp: AtomicU64::new(0),
        })
    }

    /// The directory records are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes a record, overwriting any previous snapshot for its key.
    ///
    /// The store assigns `saved_at` itself so stamps stay monotonic
    /// across saves regardless of what the caller put there.
    pub fn save(&self, mut record: SnapshotRecord) -> Result<PathBuf, SnapshotError> {
        record.saved_at = self.next_stamp();
        let path = self.path_for(&record.key);
        let bytes = serde_json::to_vec_pretty(&record).map_err(SnapshotError::Encode)?;
        fs::write(&path, bytes)?;
        tracing::info!(
            key = %record.key,
            epoch = record.epoch,
            resume_only = record.resume_only,
            "snapshot saved"
        );
        Ok(path)
    }

    /// Loads the stored record for a key.
    ///
    /// # Errors
    /// - [`SnapshotError::Missing`] if no file exists for the key
    /// - [`SnapshotError::Decode`] if the file isn't a valid record
    /// - [`SnapshotError::UnsupportedSchema`] on a version mismatch
    pub fn load(&self, key: &SessionKey) -> Result<SnapshotRecord, SnapshotError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SnapshotError::Missing(key.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let record: SnapshotRecord =
            serde_json::from_slice(&bytes).map_err(SnapshotError::Decode)?;
        if record.schema_version != SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedSchema {
                found: record.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(record)
    }

    /// Removes the stored record for a key. Returns whether one existed.
    pub fn remove(&self, key: &SessionKey) -> Result<bool, SnapshotError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a record is stored for the key.
    pub fn contains(&self, key: &SessionKey) -> bool {
        self.path_for(key).is_file()
    }

    fn path_for(&self, key: &SessionKey) -> PathBuf {
        let file = format!(
            "session_{}_vs_{}.json",
            sanitize(key.host.as_str()),
            sanitize(key.guest.as_str())
        );
        self.dir.join(file)
    }

    fn next_stamp(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut prev = self.stamp.load(Ordering::SeqCst);
        loop {
            let next = now.max(prev + 1);
            match self
                .stamp
                .compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Player ids are free-form text; file names are not. Anything outside a
/// conservative character set becomes '_'.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// =========================================================================
// Tests
// =========================================================================
