//! Error types for the session store.

use tesuji_protocol::{PlayerId, SessionKey};

/// Errors that can occur while registering or looking up sessions.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No session exists for the given key.
    #[error("session {0} not found")]
    NotFound(SessionKey),

    /// A session already exists for the given key.
    #[error("session {0} already exists")]
    SessionExists(SessionKey),

    /// One of the players is already part of another live session.
    /// A player can be in at most one session at a time.
    #[error("player {0} is already in session {1}")]
    PlayerBusy(PlayerId, SessionKey),

    /// Both seats of the key name the same player.
    #[error("player {0} cannot play against themselves")]
    SelfPairing(PlayerId),
}
