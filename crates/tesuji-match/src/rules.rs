//! The `RulesEngine` trait: the seam to the external game-rules oracle.
//!
//! The coordinator knows nothing about how pieces move. Legality,
//! check, checkmate, and board rendering are all questions it asks an
//! engine through this trait. Swapping the engine (a full shogi library,
//! the reduced [`testing`](crate::testing) rules, a remote service shim)
//! never touches coordinator code.

use tesuji_protocol::{BoardMatrix, Hands, MoveDescriptor};

/// The external rules oracle.
///
/// All methods are associated functions over an opaque `State`; the
/// engine is stateless apart from the positions it is handed. `State` is
/// authoritative only inside the coordinator's critical sections: the
/// only board representation that crosses the boundary to clients is the
/// [`BoardMatrix`] produced by [`display`](RulesEngine::display).
pub trait RulesEngine: Send + Sync + 'static {
    /// The engine's board representation. Opaque to every other layer.
    type State: Clone + Send + Sync + 'static;

    /// The initial position.
    fn initial() -> Self::State;

    /// Every legal move in the position, for the side to move.
    fn legal_moves(state: &Self::State) -> Vec<MoveDescriptor>;

    /// Applies a move, returning the successor position, or `None` if
    /// the engine refuses the move. The coordinator treats a refusal
    /// during replay as evidence of a corrupt move log.
    fn apply(state: &Self::State, mv: &MoveDescriptor) -> Option<Self::State>;

    /// Whether the side to move is currently in check.
    fn is_check(state: &Self::State) -> bool;

    /// Whether the side to move is checkmated.
    fn is_checkmate(state: &Self::State) -> bool;

    /// Flattens the position to the display matrix.
    fn display(state: &Self::State) -> BoardMatrix;

    /// Pieces in hand per board color. The coordinator recomputes the
    /// seat-keyed captured sets from this after every move, never
    /// incrementally.
    fn hands(state: &Self::State) -> Hands;
}
