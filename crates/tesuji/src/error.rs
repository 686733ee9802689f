//! Unified error type for the Tesuji stack.

use tesuji_match::MatchError;
use tesuji_protocol::NotationError;
use tesuji_session::StoreError;
use tesuji_snapshot::SnapshotError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `tesuji` meta-crate, callers deal with this single
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attributes generate the `From` impls, so `?` converts sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TesujiError {
    /// A notation-level error (squares, piece letters, move grammar).
    #[error(transparent)]
    Notation(#[from] NotationError),

    /// A session-store error (unknown key, duplicate key, busy player).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A coordinator error (turn order, legality, negotiation, undo).
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A snapshot error (I/O, encoding, schema).
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
