//! Shared vocabulary for Tesuji.
//!
//! This crate defines the language every other layer speaks:
//!
//! - **Identities** ([`PlayerId`], [`SessionKey`], [`Side`]): who is
//!   playing, and which seat they occupy.
//! - **Board vocabulary** ([`Square`], [`PieceKind`], [`BoardMatrix`],
//!   [`CapturedPieces`]): a rules-engine-agnostic picture of a position.
//! - **Move notation** ([`MoveDescriptor`], [`MoveParts`]): the canonical
//!   textual encoding used for logging, replay, and exchange.
//! - **Replies** ([`SyncState`], [`PollReply`], [`SubmitReply`], ...):
//!   the tagged payloads coordinator operations return.
//!
//! It is pure data plus serde; the crate performs no I/O and knows
//! nothing about game rules or storage.

mod error;
mod notation;
mod reply;
mod types;

pub use error::NotationError;
pub use notation::{MoveDescriptor, MoveParts};
pub use reply::{
    PollReply, ResetReply, ResignReply, SessionSummary, SubmitReply, SyncState, UndoReply,
};
pub use types::{
    BoardMatrix, BoardPiece, CapturedPieces, Color, EndReason, Hands, MoveRecord, PieceKind,
    PlayerId, ResetRequest, SessionKey, SessionStatus, Side, Square,
};
