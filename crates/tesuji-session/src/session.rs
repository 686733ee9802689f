//! The session record: one live match between two seats.
//!
//! A session owns the authoritative state for its key: the opaque board
//! (owned by the rules engine, generic here), the ordered move log, the
//! captured-piece sets, lifecycle status, terminal result, and the reset
//! negotiation state. The move log and board are kept consistent at all
//! times: the board always equals the initial position with the log
//! replayed over it.

use tesuji_protocol::{
    CapturedPieces, EndReason, MoveRecord, ResetRequest, SessionKey, SessionStatus, Side,
};

use crate::turn_of;

/// A single session's authoritative state.
///
/// Generic over `B`, the rules engine's board representation. The session
/// layer never inspects the board; it only stores and hands it back.
#[derive(Debug, Clone)]
pub struct Session<B> {
    pub key: SessionKey,
    /// Which seat moves first. May change only through a forced reset
    /// with seat swap.
    pub first_mover: Side,
    pub board: B,
    pub move_log: Vec<MoveRecord>,
    pub captured: CapturedPieces,
    pub status: SessionStatus,
    pub winner: Option<Side>,
    pub end_reason: Option<EndReason>,
    pub resigner: Option<Side>,
    /// Pending reset negotiation, if any. Once `accepted` is set the
    /// request only survives until a poll delivers the resync notice.
    pub reset_request: Option<ResetRequest>,
    /// Incremented on every completed or forced reset, and on resume.
    /// Never decreases, never repeats.
    pub reset_epoch: u64,
    pub last_comment: String,
}

impl<B> Session<B> {
    /// A freshly accepted session: empty log, epoch 0, not yet started.
    pub fn new(key: SessionKey, first_mover: Side, board: B) -> Self {
        Self {
            key,
            first_mover,
            board,
            move_log: Vec::new(),
            captured: CapturedPieces::default(),
            status: SessionStatus::Accepted,
            winner: None,
            end_reason: None,
            resigner: None,
            reset_request: None,
            reset_epoch: 0,
            last_comment: String::new(),
        }
    }

    /// The seat to move, or `None` once the session has ended.
    pub fn turn(&self) -> Option<Side> {
        if self.is_ended() {
            None
        } else {
            Some(turn_of(self.first_mover, self.move_log.len()))
        }
    }

    pub fn is_ended(&self) -> bool {
        self.status.is_terminal()
    }

    /// Marks the session ended. Winner and reason are set together; the
    /// pair stays immutable until an explicit reset.
    pub fn end(&mut self, winner: Side, reason: EndReason, resigner: Option<Side>) {
        self.status = SessionStatus::Ended;
        self.winner = Some(winner);
        self.end_reason = Some(reason);
        self.resigner = resigner;
    }

    /// Reinitializes the playable state under a fresh epoch: new board,
    /// empty log and captured sets, terminal fields cleared, status back
    /// to `Ongoing`. The reset negotiation state is left untouched so the
    /// caller controls whether a resync notice stays pending.
    pub fn reinitialize(&mut self, board: B) {
        self.board = board;
        self.move_log.clear();
        self.captured = CapturedPieces::default();
        self.status = SessionStatus::Ongoing;
        self.winner = None;
        self.end_reason = None;
        self.resigner = None;
        self.last_comment.clear();
        self.reset_epoch += 1;
    }
}

// =========================================================================
// Tests
// =========================================================================
