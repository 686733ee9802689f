//! The snapshot record: a session flattened to plain, replayable data.
//!
//! A record never contains the rules engine's internal board state. The
//! move list (canonical notation) is the authoritative part; the board
//! matrix is carried for display only, so a lobby can preview a paused
//! game without loading an engine.

use serde::{Deserialize, Serialize};

use tesuji_protocol::{
    BoardMatrix, CapturedPieces, EndReason, SessionKey, SessionStatus, Side,
};

/// Current schema version. Bump when the record layout changes shape.
pub const SCHEMA_VERSION: u32 = 1;

/// One stored session, keyed by its [`SessionKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Layout version; readers refuse records they don't understand.
    pub schema_version: u32,
    pub key: SessionKey,
    pub first_mover: Side,
    pub status: SessionStatus,
    /// Reset epoch the session was at when saved. Stale-epoch records are
    /// refused at resume time.
    pub epoch: u64,
    /// Monotonically increasing save stamp assigned by the store.
    pub saved_at: u64,
    /// True for a resumable pause, false for a terminal archive.
    pub resume_only: bool,
    /// The move log in canonical notation, in order. Replaying this list
    /// through the rules engine from the initial position reconstructs
    /// the authoritative board.
    pub moves: Vec<String>,
    /// Display-only board; never used for legality.
    pub board: BoardMatrix,
    pub captured: CapturedPieces,
    pub winner: Option<Side>,
    pub end_reason: Option<EndReason>,
    pub resigner: Option<Side>,
    pub last_comment: String,
}

impl SnapshotRecord {
    /// True when the stored session had already ended. Terminal records
    /// archive a result; they are never resumable.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
