//! The coordinator: every operation two polling clients can perform on a
//! shared session.
//!
//! Each operation is a short critical section under the session's own
//! mutex: look the session up, mutate or read it, build a reply, return.
//! Nothing blocks waiting for the opponent; "waiting" is a reply variant,
//! and clients simply poll again. Operations on different keys never
//! contend.
//!
//! Every reply embeds a full [`SyncState`], so any single response can
//! rebuild a client from nothing. That is what makes the endpoints safe
//! under retries, duplicate polls, and arbitrary polling cadence.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use tesuji_protocol::{
    CapturedPieces, EndReason, MoveDescriptor, MoveParts, MoveRecord, PollReply, ResetReply,
    ResetRequest, ResignReply, SessionKey, SessionStatus, SessionSummary, Side, SubmitReply,
    SyncState, UndoReply,
};
use tesuji_session::{turn_of, Session, SessionStore};
use tesuji_snapshot::{SnapshotRecord, SnapshotStore, SCHEMA_VERSION};

use crate::{CoordinatorConfig, MatchError, RulesEngine};

/// The authoritative server-side coordinator for two-seat sessions.
///
/// Generic over the rules oracle `R`; the coordinator itself holds no
/// game knowledge. The store is injected so tests (and multi-tenant
/// setups) run as many independent coordinators as they like.
pub struct Coordinator<R: RulesEngine> {
    store: Arc<SessionStore<R::State>>,
    snapshots: SnapshotStore,
    config: CoordinatorConfig,
    _rules: PhantomData<R>,
}

impl<R: RulesEngine> Coordinator<R> {
    pub fn new(
        store: Arc<SessionStore<R::State>>,
        snapshots: SnapshotStore,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            store,
            snapshots,
            config,
            _rules: PhantomData,
        }
    }

    /// The injected session store.
    pub fn store(&self) -> &Arc<SessionStore<R::State>> {
        &self.store
    }

    /// The injected snapshot store.
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Registers a freshly accepted pairing. This is the event matchmaking
    /// produces; the session starts in `Accepted` at epoch 0.
    pub async fn create_session(
        &self,
        key: SessionKey,
        first_mover: Side,
    ) -> Result<SyncState, MatchError> {
        let handle = self
            .store
            .create(key, first_mover, R::initial())
            .await?;
        let session = handle.lock().await;
        Ok(Self::sync_of(&session))
    }

    /// Promotes an accepted session to `Ongoing`. Idempotent when already
    /// started.
    pub async fn start(&self, key: &SessionKey) -> Result<SyncState, MatchError> {
        let handle = self.store.get(key).await?;
        let mut session = handle.lock().await;
        match session.status {
            SessionStatus::Ended => Err(MatchError::AlreadyTerminal(key.clone())),
            SessionStatus::Ongoing => Ok(Self::sync_of(&session)),
            SessionStatus::Accepted => {
                session.status = SessionStatus::Ongoing;
                tracing::info!(%key, "session started");
                Ok(Self::sync_of(&session))
            }
        }
    }

    /// Destroys a session, releasing both players. Any stored snapshot is
    /// left untouched; an interrupted game stays resumable after the
    /// process that held it is gone.
    pub async fn leave(&self, key: &SessionKey) -> Result<(), MatchError> {
        self.store.remove(key).await?;
        Ok(())
    }

    /// A cheap read-only status line.
    pub async fn session_summary(&self, key: &SessionKey) -> Result<SessionSummary, MatchError> {
        let handle = self.store.get(key).await?;
        let session = handle.lock().await;
        Ok(SessionSummary {
            key: session.key.clone(),
            status: session.status,
            first_mover: session.first_mover,
            move_count: session.move_log.len(),
            winner: session.winner,
            end_reason: session.end_reason,
            epoch: session.reset_epoch,
        })
    }

    // -----------------------------------------------------------------------
    // Move submission
    // -----------------------------------------------------------------------

    /// Validates and applies one move.
    ///
    /// Checks run in a fixed order, each with its own failure: the session
    /// exists; it is not already over (a retry after the terminal move
    /// gets the unchanged terminal state back, not an error); it has been
    /// started; it is the submitter's turn; the request is well-formed;
    /// the move is legal. On success the board, log, captured sets, and a
    /// possible checkmate all commit in one critical section; no poll can
    /// observe the move applied but the game not yet marked over.
    pub async fn submit_move(
        &self,
        key: &SessionKey,
        side: Side,
        parts: MoveParts,
        comment: Option<&str>,
    ) -> Result<SubmitReply, MatchError> {
        let handle = self.store.get(key).await?;
        let mut session = handle.lock().await;

        if session.is_ended() {
            tracing::debug!(%key, %side, "move after game end; returning terminal state");
            return Ok(SubmitReply::AlreadyEnded {
                sync: Self::sync_of(&session),
            });
        }
        if session.status == SessionStatus::Accepted {
            return Err(MatchError::NotStarted(key.clone()));
        }

        let turn = turn_of(session.first_mover, session.move_log.len());
        if turn != side {
            tracing::debug!(%key, %side, %turn, "move out of turn");
            return Err(MatchError::NotYourTurn { side, turn });
        }

        let descriptor = parts.validate()?;

        if !R::legal_moves(&session.board).contains(&descriptor) {
            let in_check = R::is_check(&session.board);
            tracing::debug!(%key, %side, notation = %descriptor, in_check, "illegal move");
            return Err(MatchError::IllegalMove { in_check });
        }
        let Some(next) = R::apply(&session.board, &descriptor) else {
            // The oracle listed the move as legal and then refused it.
            tracing::error!(%key, notation = %descriptor, "rules engine refused a listed legal move");
            return Err(MatchError::IllegalMove {
                in_check: R::is_check(&session.board),
            });
        };

        session.board = next;
        let record = MoveRecord::new(session.move_log.len(), side, descriptor);
        session.move_log.push(record.clone());
        // Captured sets are recomputed from the board every time, never
        // maintained incrementally, so they cannot drift from it.
        session.captured =
            CapturedPieces::from_hands(R::hands(&session.board), session.first_mover);
        session.last_comment = comment
            .map(|c| self.config.clip_comment(c))
            .unwrap_or_default();

        let in_check = R::is_check(&session.board);
        if R::is_checkmate(&session.board) {
            session.end(side, EndReason::Checkmate, None);
            tracing::info!(%key, winner = %side, "checkmate");
        }

        tracing::info!(
            %key,
            %side,
            notation = %record.notation,
            move_count = session.move_log.len(),
            "move applied"
        );
        Ok(SubmitReply::Applied {
            record,
            in_check,
            sync: Self::sync_of(&session),
        })
    }

    // -----------------------------------------------------------------------
    // Polling
    // -----------------------------------------------------------------------

    /// Answers "what changed since my last known move count".
    ///
    /// Resolution order, first match wins:
    /// 1. ended: the terminal result, on every poll, forever
    /// 2. an accepted reset: the one-time resync notice
    /// 3. a pending reset: reported without mutating anything
    /// 4. an impossible client count: full resync instruction
    /// 5. the server is ahead: the latest move plus a refreshed board
    /// 6. nothing new: waiting
    pub async fn poll(
        &self,
        key: &SessionKey,
        requester: Side,
        known_move_count: i64,
    ) -> Result<PollReply, MatchError> {
        let handle = self.store.get(key).await?;
        let mut session = handle.lock().await;

        if session.is_ended() {
            match (session.winner, session.end_reason) {
                (Some(winner), Some(reason)) => {
                    return Ok(PollReply::Ended {
                        winner,
                        reason,
                        resigner: session.resigner,
                        sync: Self::sync_of(&session),
                    });
                }
                _ => tracing::error!(%key, "ended session is missing winner or reason"),
            }
        }

        // The negotiation outranks move delivery: while a request is
        // pending the in-flight log is retained but not reported as new
        // moves, and an accepted reset is delivered exactly once.
        if let Some(req) = session.reset_request.clone() {
            if req.accepted {
                session.reset_request = None;
                tracing::info!(
                    %key,
                    %requester,
                    epoch = session.reset_epoch,
                    "resync notice delivered"
                );
                return Ok(PollReply::Resynced {
                    epoch: session.reset_epoch,
                    sync: Self::sync_of(&session),
                });
            }
            return Ok(PollReply::Pending {
                requested_by: req.requested_by,
                comment: req.comment,
                sync: Self::sync_of(&session),
            });
        }

        let count = session.move_log.len();
        if known_move_count < 0 || known_move_count as usize > count {
            tracing::debug!(%key, %requester, known_move_count, count, "stale client count");
            return Ok(PollReply::Resynced {
                epoch: session.reset_epoch,
                sync: Self::sync_of(&session),
            });
        }

        if (known_move_count as usize) < count {
            if let Some(record) = session.move_log.last() {
                return Ok(PollReply::Moved {
                    record: record.clone(),
                    in_check: R::is_check(&session.board),
                    sync: Self::sync_of(&session),
                });
            }
        }

        Ok(PollReply::Waiting {
            sync: Self::sync_of(&session),
        })
    }

    // -----------------------------------------------------------------------
    // Reset negotiation
    // -----------------------------------------------------------------------

    /// Opens a reset negotiation. At most one may be outstanding; the
    /// in-flight move log is retained untouched while the request waits.
    pub async fn request_reset(
        &self,
        key: &SessionKey,
        side: Side,
        comment: &str,
    ) -> Result<ResetReply, MatchError> {
        let handle = self.store.get(key).await?;
        let mut session = handle.lock().await;

        if session.is_ended() {
            return Err(MatchError::AlreadyTerminal(key.clone()));
        }
        if let Some(req) = &session.reset_request {
            return Err(MatchError::ResetPending(key.clone(), req.requested_by));
        }

        let comment = self.config.clip_comment(comment);
        session.reset_request = Some(ResetRequest {
            requested_by: side,
            comment: comment.clone(),
            accepted: false,
        });
        tracing::info!(%key, %side, "reset requested");
        Ok(ResetReply::Requested {
            requested_by: side,
            comment,
            sync: Self::sync_of(&session),
        })
    }

    /// Completes a pending negotiation: the session is reinitialized under
    /// a fresh epoch right here, and the accepted request is left behind
    /// as a one-shot marker so the next poll delivers the resync notice.
    pub async fn accept_reset(&self, key: &SessionKey) -> Result<ResetReply, MatchError> {
        let handle = self.store.get(key).await?;
        let mut session = handle.lock().await;

        if session.is_ended() {
            return Err(MatchError::AlreadyTerminal(key.clone()));
        }
        let pending = session.reset_request.clone();
        match pending {
            None => Err(MatchError::NoResetPending(key.clone())),
            // A second accept after the reset already happened: nothing is
            // pending anymore.
            Some(req) if req.accepted => Err(MatchError::NoResetPending(key.clone())),
            Some(req) => {
                session.reinitialize(R::initial());
                session.reset_request = Some(ResetRequest {
                    accepted: true,
                    ..req
                });
                tracing::info!(
                    %key,
                    epoch = session.reset_epoch,
                    "reset accepted; session reinitialized"
                );
                Ok(ResetReply::Accepted {
                    sync: Self::sync_of(&session),
                })
            }
        }
    }

    /// Withdraws a pending request. Only the requester may cancel, and
    /// only before acceptance; play continues from the retained log.
    pub async fn cancel_reset(
        &self,
        key: &SessionKey,
        side: Side,
    ) -> Result<ResetReply, MatchError> {
        let handle = self.store.get(key).await?;
        let mut session = handle.lock().await;

        if session.is_ended() {
            return Err(MatchError::AlreadyTerminal(key.clone()));
        }
        match session.reset_request.clone() {
            None => Err(MatchError::NoResetPending(key.clone())),
            Some(req) if req.accepted => Err(MatchError::NoResetPending(key.clone())),
            Some(req) if req.requested_by != side => {
                Err(MatchError::NotResetRequester(key.clone()))
            }
            Some(_) => {
                session.reset_request = None;
                tracing::info!(%key, %side, "reset request withdrawn");
                Ok(ResetReply::Cancelled {
                    sync: Self::sync_of(&session),
                })
            }
        }
    }

    /// Unconditional reset outside the negotiation, optionally swapping
    /// the first mover. Works on ended sessions; this is the sanctioned
    /// way out of a terminal state.
    pub async fn force_reset(
        &self,
        key: &SessionKey,
        swap_first: bool,
    ) -> Result<ResetReply, MatchError> {
        let handle = self.store.get(key).await?;
        let mut session = handle.lock().await;

        if swap_first {
            session.first_mover = session.first_mover.opponent();
        }
        session.reinitialize(R::initial());
        session.reset_request = None;
        tracing::info!(
            %key,
            epoch = session.reset_epoch,
            first_mover = %session.first_mover,
            swap_first,
            "session force-reset"
        );
        Ok(ResetReply::Forced {
            first_mover: session.first_mover,
            sync: Self::sync_of(&session),
        })
    }

    // -----------------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------------

    /// Reverts the most recent move, allowed only for the seat that made
    /// it. The board is rebuilt by replaying the shortened log from the
    /// initial position; a terminal status the removed move produced
    /// (checkmate) is cleared, but a resignation is not undoable.
    pub async fn undo(&self, key: &SessionKey, side: Side) -> Result<UndoReply, MatchError> {
        let handle = self.store.get(key).await?;
        let mut session = handle.lock().await;

        if session.is_ended() && session.end_reason != Some(EndReason::Checkmate) {
            return Err(MatchError::AlreadyTerminal(key.clone()));
        }
        let Some(last) = session.move_log.last().cloned() else {
            return Err(MatchError::UndoNotAllowed {
                reason: "the move log is empty",
            });
        };
        if last.mover != side {
            return Err(MatchError::UndoNotAllowed {
                reason: "only your own last move can be undone",
            });
        }

        session.move_log.pop();
        match Self::replay(&session.move_log) {
            Ok(board) => {
                session.board = board;
            }
            Err(index) => {
                tracing::error!(
                    %key,
                    index,
                    "board could not be reproduced from the session's own log; forcing safe state"
                );
                session.reinitialize(R::initial());
                session.reset_request = None;
                return Err(MatchError::CorruptLog {
                    key: key.clone(),
                    index,
                });
            }
        }

        session.captured =
            CapturedPieces::from_hands(R::hands(&session.board), session.first_mover);
        session.status = SessionStatus::Ongoing;
        session.winner = None;
        session.end_reason = None;
        session.resigner = None;

        tracing::info!(
            %key,
            %side,
            notation = %last.notation,
            move_count = session.move_log.len(),
            "move undone"
        );
        Ok(UndoReply {
            undone: last,
            sync: Self::sync_of(&session),
        })
    }

    // -----------------------------------------------------------------------
    // Resignation
    // -----------------------------------------------------------------------

    /// Ends the game in the opponent's favor. Idempotent: once the session
    /// has ended, by resignation or otherwise, the existing result comes
    /// back unchanged and nothing is overwritten.
    pub async fn resign(&self, key: &SessionKey, side: Side) -> Result<ResignReply, MatchError> {
        let handle = self.store.get(key).await?;
        let mut session = handle.lock().await;

        if session.is_ended() {
            if let (Some(winner), Some(reason)) = (session.winner, session.end_reason) {
                tracing::debug!(%key, %side, "resignation after game end; echoing result");
                return Ok(ResignReply {
                    winner,
                    reason,
                    resigner: session.resigner,
                    sync: Self::sync_of(&session),
                });
            }
        }

        let winner = side.opponent();
        session.end(winner, EndReason::Resignation, Some(side));
        tracing::info!(%key, resigner = %side, %winner, "resignation");
        Ok(ResignReply {
            winner,
            reason: EndReason::Resignation,
            resigner: Some(side),
            sync: Self::sync_of(&session),
        })
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Writes a resumable snapshot of a live session, overwriting any
    /// previous one for the key. The live session stays in place.
    pub async fn suspend(&self, key: &SessionKey) -> Result<PathBuf, MatchError> {
        let handle = self.store.get(key).await?;
        let session = handle.lock().await;
        if session.is_ended() {
            return Err(MatchError::AlreadyTerminal(key.clone()));
        }
        Ok(self.snapshots.save(Self::record_of(&session, true))?)
    }

    /// Writes a terminal archive of an ended session.
    pub async fn archive(&self, key: &SessionKey) -> Result<PathBuf, MatchError> {
        let handle = self.store.get(key).await?;
        let session = handle.lock().await;
        if !session.is_ended() {
            return Err(MatchError::NotEnded(key.clone()));
        }
        Ok(self.snapshots.save(Self::record_of(&session, false))?)
    }

    /// Restores an interrupted session from its stored snapshot.
    ///
    /// The stored board matrix is display-only; the authoritative board
    /// is rebuilt by replaying the canonical move list from the initial
    /// position, which also re-derives turn ownership and captured sets.
    /// Terminal, non-resumable, or stale-epoch records are refused, as is
    /// resuming over a live session that has since ended. The resumed
    /// session re-enters play at `snapshot.epoch + 1`.
    pub async fn resume(&self, key: &SessionKey) -> Result<SyncState, MatchError> {
        let record = self.snapshots.load(key)?;
        if record.is_terminal() {
            return Err(MatchError::SnapshotTerminal(key.clone()));
        }
        if !record.resume_only {
            return Err(MatchError::SnapshotNotResumable(key.clone()));
        }

        // Hold the live session's lock (if any) across the swap so no
        // move lands between the epoch check and the install.
        let live = self.store.lookup(key).await;
        let live_guard = match &live {
            Some(handle) => Some(handle.lock().await),
            None => None,
        };
        if let Some(guard) = &live_guard {
            if guard.is_ended() {
                return Err(MatchError::AlreadyTerminal(key.clone()));
            }
            if guard.reset_epoch > record.epoch {
                return Err(MatchError::StaleSnapshot {
                    saved: record.epoch,
                    live: guard.reset_epoch,
                });
            }
        }

        // Rebuild the log from canonical notation; movers re-derive from
        // parity against the stored first mover.
        let mut log = Vec::with_capacity(record.moves.len());
        for (index, text) in record.moves.iter().enumerate() {
            let descriptor: MoveDescriptor = text.parse()?;
            log.push(MoveRecord::new(
                index,
                turn_of(record.first_mover, index),
                descriptor,
            ));
        }
        let board = match Self::replay(&log) {
            Ok(board) => board,
            Err(index) => {
                tracing::error!(%key, index, "stored move log failed to replay; resume refused");
                return Err(MatchError::CorruptLog {
                    key: key.clone(),
                    index,
                });
            }
        };

        let mut session = Session::new(key.clone(), record.first_mover, board);
        session.captured =
            CapturedPieces::from_hands(R::hands(&session.board), record.first_mover);
        session.move_log = log;
        session.status = SessionStatus::Ongoing;
        session.reset_epoch = record.epoch + 1;
        session.last_comment = record.last_comment.clone();

        let handle = self.store.install(session).await?;
        drop(live_guard);
        let session = handle.lock().await;
        tracing::info!(
            %key,
            epoch = session.reset_epoch,
            move_count = session.move_log.len(),
            "session resumed from snapshot"
        );
        Ok(Self::sync_of(&session))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Replays a move log from the initial position. Returns the index of
    /// the first record the engine refuses, if any.
    fn replay(log: &[MoveRecord]) -> Result<R::State, usize> {
        let mut state = R::initial();
        for (index, record) in log.iter().enumerate() {
            match R::apply(&state, &record.descriptor) {
                Some(next) => state = next,
                None => return Err(index),
            }
        }
        Ok(state)
    }

    fn sync_of(session: &Session<R::State>) -> SyncState {
        SyncState {
            board: R::display(&session.board),
            captured: session.captured.clone(),
            move_count: session.move_log.len(),
            turn: session.turn(),
            status: session.status,
            winner: session.winner,
            end_reason: session.end_reason,
            resigner: session.resigner,
            epoch: session.reset_epoch,
            last_comment: session.last_comment.clone(),
        }
    }

    fn record_of(session: &Session<R::State>, resume_only: bool) -> SnapshotRecord {
        SnapshotRecord {
            schema_version: SCHEMA_VERSION,
            key: session.key.clone(),
            first_mover: session.first_mover,
            status: session.status,
            epoch: session.reset_epoch,
            // Assigned by the snapshot store on save.
            saved_at: 0,
            resume_only,
            moves: session
                .move_log
                .iter()
                .map(|record| record.notation.clone())
                .collect(),
            board: R::display(&session.board),
            captured: session.captured.clone(),
            winner: session.winner,
            end_reason: session.end_reason,
            resigner: session.resigner,
            last_comment: session.last_comment.clone(),
        }
    }
}
