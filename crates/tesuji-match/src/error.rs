//! Error types for coordinator operations.
//!
//! Every failure is local, synchronous, and recoverable; nothing here is
//! fatal to the process. The one near-exception is [`MatchError::CorruptLog`]:
//! it means a session's board could not be reproduced from its own move
//! log, which is reported only after the session has been forced back to
//! a safe state.

use tesuji_protocol::{NotationError, SessionKey, Side};
use tesuji_session::StoreError;
use tesuji_snapshot::SnapshotError;

fn check_note(in_check: &bool) -> &'static str {
    if *in_check { " (the mover is in check)" } else { "" }
}

/// Errors returned by [`Coordinator`](crate::Coordinator) operations.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// Registry-level failure: unknown session, duplicate key, busy player.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The session exists but has not been started yet.
    #[error("session {0} has not been started")]
    NotStarted(SessionKey),

    /// The submitting seat is not the seat to move.
    #[error("not {side}'s turn ({turn} to move)")]
    NotYourTurn { side: Side, turn: Side },

    /// The move request was structurally invalid or unparseable.
    #[error(transparent)]
    Malformed(#[from] NotationError),

    /// The move is well-formed but not legal in the current position.
    /// Carries whether the mover is currently in check, since that is the
    /// usual explanation.
    #[error("illegal move{}", check_note(.in_check))]
    IllegalMove { in_check: bool },

    /// A mutating call on a session that has already ended.
    #[error("session {0} has already ended")]
    AlreadyTerminal(SessionKey),

    /// A reset was requested while another request is outstanding.
    #[error("a reset is already pending for {0} (requested by {1})")]
    ResetPending(SessionKey, Side),

    /// Accept or cancel was called with no reset pending.
    #[error("no reset is pending for {0}")]
    NoResetPending(SessionKey),

    /// Only the side that requested a reset may withdraw it.
    #[error("only the requesting side may cancel the reset for {0}")]
    NotResetRequester(SessionKey),

    /// Undo preconditions not met: empty log, someone else's move, or a
    /// terminal state the last move did not produce.
    #[error("cannot undo: {reason}")]
    UndoNotAllowed { reason: &'static str },

    /// Replaying the session's own move log failed at `index`. The
    /// session has been forced to a fresh state under a new epoch.
    #[error("move log of {key} failed to replay at index {index}; session was reset")]
    CorruptLog { key: SessionKey, index: usize },

    /// Archive requested for a session that has not ended.
    #[error("session {0} has not ended; nothing to archive")]
    NotEnded(SessionKey),

    /// The stored snapshot is a terminal archive; it cannot be resumed.
    #[error("snapshot for {0} records a finished game and cannot be resumed")]
    SnapshotTerminal(SessionKey),

    /// The stored snapshot is not flagged as a resumable pause.
    #[error("snapshot for {0} is not flagged resumable")]
    SnapshotNotResumable(SessionKey),

    /// The stored snapshot predates the live session's epoch.
    #[error("snapshot at epoch {saved} is stale; live session is at epoch {live}")]
    StaleSnapshot { saved: u64, live: u64 },

    /// Snapshot storage failure (I/O, encoding, missing file, schema).
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tesuji_protocol::SessionKey;

    #[test]
    fn test_illegal_move_display_mentions_check_only_when_checked() {
        let plain = MatchError::IllegalMove { in_check: false };
        assert_eq!(plain.to_string(), "illegal move");

        let checked = MatchError::IllegalMove { in_check: true };
        assert_eq!(checked.to_string(), "illegal move (the mover is in check)");
    }

    #[test]
    fn test_store_error_converts_transparently() {
        let err: MatchError = StoreError::NotFound(SessionKey::new("a", "b")).into();
        assert!(matches!(err, MatchError::Store(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_notation_error_converts_to_malformed() {
        let err: MatchError = NotationError::MalformedMove("no source").into();
        assert!(matches!(err, MatchError::Malformed(_)));
    }
}
