//! # Tesuji
//!
//! Server-side coordinator for two-player, turn-based board game sessions
//! where both clients talk to the backend exclusively through stateless
//! polling. Tesuji keeps one authoritative session per player pair,
//! serializes concurrent move submissions, answers "what changed since my
//! last poll", mediates mutual reset negotiations, supports single-ply
//! undo and resignation, and suspends/resumes interrupted sessions via
//! snapshots.
//!
//! Game rules are not part of Tesuji: legality, check, checkmate, and
//! board rendering come from an external oracle plugged in through the
//! [`RulesEngine`] trait.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use tesuji::prelude::*;
//! use tesuji::testing::SimpleRules;
//!
//! # async fn run() -> Result<(), tesuji::TesujiError> {
//! let store = Arc::new(SessionStore::new());
//! let snapshots = SnapshotStore::new("snapshots")?;
//! let coordinator: Coordinator<SimpleRules> =
//!     Coordinator::new(store, snapshots, CoordinatorConfig::default());
//!
//! let key = SessionKey::new("alice", "bob");
//! coordinator.create_session(key.clone(), Side::Host).await?;
//! coordinator.start(&key).await?;
//! // Clients now alternate submit_move and poll.
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::TesujiError;

pub use tesuji_match::{testing, Coordinator, CoordinatorConfig, MatchError, RulesEngine};
pub use tesuji_protocol::{
    BoardMatrix, BoardPiece, CapturedPieces, Color, EndReason, Hands, MoveDescriptor, MoveParts,
    MoveRecord, NotationError, PieceKind, PlayerId, PollReply, ResetReply, ResetRequest,
    ResignReply, SessionKey, SessionStatus, SessionSummary, Side, Square, SubmitReply, SyncState,
    UndoReply,
};
pub use tesuji_session::{turn_of, Session, SessionHandle, SessionStore, StoreError};
pub use tesuji_snapshot::{SnapshotError, SnapshotRecord, SnapshotStore, SCHEMA_VERSION};

/// The common imports for building on Tesuji.
pub mod prelude {
    pub use crate::{
        Coordinator, CoordinatorConfig, MoveParts, PollReply, ResetReply, RulesEngine, SessionKey,
        SessionStore, Side, SnapshotStore, SubmitReply, TesujiError,
    };
}
