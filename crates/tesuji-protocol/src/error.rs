//! Error types for the protocol layer.

/// Errors produced while parsing or validating move notation.
///
/// These cover the textual side of the protocol: squares, piece letters,
/// and the canonical move strings used for logging and replay. Anything
/// that fails here never reached the rules engine.
#[derive(Debug, thiserror::Error)]
pub enum NotationError {
    /// A square outside the 9x9 board, e.g. file 0 or rank 'j'.
    #[error("square out of range: {0}")]
    SquareOutOfRange(String),

    /// A flat cell index outside 0..=80.
    #[error("cell index {0} out of range (expected 0..=80)")]
    IndexOutOfRange(i64),

    /// A letter that names no piece kind.
    #[error("unknown piece letter: {0:?}")]
    UnknownPiece(String),

    /// A move string that doesn't match the canonical grammar.
    #[error("unparseable move notation: {0:?}")]
    BadMove(String),

    /// A structurally invalid move request, e.g. a drop without a piece
    /// kind, or a request naming both a source square and a drop piece.
    #[error("malformed move: {0}")]
    MalformedMove(&'static str),
}
