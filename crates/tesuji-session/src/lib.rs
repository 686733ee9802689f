//! Session records and the live-session registry for Tesuji.
//!
//! This crate owns the coordinator's notion of "a match in progress":
//!
//! 1. **The session record** ([`Session`]): move log, captured sets,
//!    lifecycle status, terminal result, reset negotiation, epoch.
//! 2. **Turn resolution** ([`turn_of`]): derived from metadata alone,
//!    never from the board.
//! 3. **The store** ([`SessionStore`]): the registry mapping each
//!    [`SessionKey`](tesuji_protocol::SessionKey) to its session behind a
//!    per-key mutex.
//!
//! The board type is generic everywhere: the session layer stores the
//! rules engine's state but never interprets it.

mod error;
mod session;
mod store;
mod turn;

pub use error::StoreError;
pub use session::Session;
pub use store::{SessionHandle, SessionStore};
pub use turn::turn_of;
