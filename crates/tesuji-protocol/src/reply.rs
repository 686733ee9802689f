//! Reply payloads returned by every coordinator operation.
//!
//! The contract with clients is that any single reply is enough to rebuild
//! their entire local view: each variant embeds a full [`SyncState`]
//! (board, captured sets, move count, turn, epoch). Clients that track
//! deltas use the variant; clients that lost state use the payload.

use serde::{Deserialize, Serialize};

use crate::{
    BoardMatrix, CapturedPieces, EndReason, MoveRecord, SessionKey, SessionStatus, Side,
};

// ---------------------------------------------------------------------------
// SyncState
// ---------------------------------------------------------------------------

/// The full-resynchronization payload carried by every reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Display board, always current.
    pub board: BoardMatrix,
    /// Captured pieces per seat, recomputed from the board every move.
    pub captured: CapturedPieces,
    /// Length of the move log; clients feed this back as their next
    /// `known_move_count`.
    pub move_count: usize,
    /// Whose turn it is. `None` once the session has ended.
    pub turn: Option<Side>,
    pub status: SessionStatus,
    pub winner: Option<Side>,
    pub end_reason: Option<EndReason>,
    pub resigner: Option<Side>,
    /// Reset epoch observed when this reply was built. Any durable
    /// reference a client keeps should be tagged with it.
    pub epoch: u64,
    pub last_comment: String,
}

// ---------------------------------------------------------------------------
// Operation replies
// ---------------------------------------------------------------------------

/// Reply to a move submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmitReply {
    /// The move was applied. If it delivered checkmate, `sync.status` is
    /// already `Ended` in this same reply; there is no intermediate state.
    Applied {
        record: MoveRecord,
        /// Whether the side now to move is in check.
        in_check: bool,
        sync: SyncState,
    },
    /// The session had already ended; nothing was applied. Safe to
    /// receive on retries after the terminal move.
    AlreadyEnded { sync: SyncState },
}

/// Reply to a poll. Variants are listed in resolution order; the first
/// matching condition wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PollReply {
    /// The session has ended. Returned on every poll thereafter,
    /// unconditionally, so both clients converge no matter how often or
    /// late they ask.
    Ended {
        winner: Side,
        reason: EndReason,
        resigner: Option<Side>,
        sync: SyncState,
    },
    /// Discard local state and rebuild from `sync`. Sent once after an
    /// accepted reset (with the fresh epoch), and whenever the client's
    /// reported move count is unusable.
    Resynced { epoch: u64, sync: SyncState },
    /// A reset request is awaiting the other side's decision.
    Pending {
        requested_by: Side,
        comment: String,
        sync: SyncState,
    },
    /// At least one new move since the client's last known count. Carries
    /// the most recent record; the board in `sync` already reflects all
    /// of them.
    Moved {
        record: MoveRecord,
        in_check: bool,
        sync: SyncState,
    },
    /// Nothing changed; poll again later.
    Waiting { sync: SyncState },
}

impl PollReply {
    /// The embedded full-sync payload, whatever the variant.
    pub fn sync(&self) -> &SyncState {
        match self {
            Self::Ended { sync, .. }
            | Self::Resynced { sync, .. }
            | Self::Pending { sync, .. }
            | Self::Moved { sync, .. }
            | Self::Waiting { sync } => sync,
        }
    }
}

/// Reply to an undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoReply {
    /// The record that was removed from the log.
    pub undone: MoveRecord,
    pub sync: SyncState,
}

/// Reply to a resignation. Duplicated resignations return the original
/// terminal result unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResignReply {
    pub winner: Side,
    pub reason: EndReason,
    pub resigner: Option<Side>,
    pub sync: SyncState,
}

/// Reply to the reset-negotiation operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResetReply {
    /// A request is now pending the other side's decision.
    Requested {
        requested_by: Side,
        comment: String,
        sync: SyncState,
    },
    /// The negotiation completed; the session was reinitialized under the
    /// epoch in `sync`. The next poll delivers the one-time resync notice.
    Accepted { sync: SyncState },
    /// The requester withdrew; play continues from the retained log.
    Cancelled { sync: SyncState },
    /// An unconditional reset outside the negotiation, possibly with the
    /// first mover swapped.
    Forced { first_mover: Side, sync: SyncState },
}

/// A cheap read-only status line for lobby-style displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub key: SessionKey,
    pub status: SessionStatus,
    pub first_mover: Side,
    pub move_count: usize,
    pub winner: Option<Side>,
    pub end_reason: Option<EndReason>,
    pub epoch: u64,
}

// =========================================================================
// Tests
// =========================================================================
