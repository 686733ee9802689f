//! Error types for the snapshot layer.

use tesuji_protocol::SessionKey;

/// Errors that can occur while saving or loading snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem trouble: missing directory, permissions, disk.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("snapshot encode failed: {0}")]
    Encode(serde_json::Error),

    /// The stored file could not be parsed as a snapshot record.
    #[error("snapshot decode failed: {0}")]
    Decode(serde_json::Error),

    /// No snapshot is stored for the given key.
    #[error("no snapshot stored for {0}")]
    Missing(SessionKey),

    /// The stored record was written by an incompatible schema.
    #[error("unsupported snapshot schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },
}
