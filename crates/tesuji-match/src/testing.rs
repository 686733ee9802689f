//! A deterministic reduced rules engine for tests and demos.
//!
//! [`SimpleRules`] plays a cut-down 9x9 game with four piece kinds
//! (King, Gold, Rook, Pawn), captures to hand, drops, and pawn promotion.
//! It is not shogi; it is just enough of a game to exercise every
//! coordinator path: legality, captures, drops, forced promotion, check,
//! checkmate, and full-log replay. Movement:
//!
//! - King: one step in any of the eight directions
//! - Gold (and a promoted pawn): one step orthogonally
//! - Rook: slides orthogonally
//! - Pawn: one step toward the enemy camp; promotes (optionally) in the
//!   far three ranks, mandatorily on the last rank
//! - Drops: any piece in hand onto any empty square, except a pawn onto
//!   its last rank
//!
//! A move is legal when it does not leave the mover's own king attacked.
//! Checkmate is check with no legal moves. Positions are built with the
//! chained [`SimpleBoard`] constructors, so tests read as diagrams.

use tesuji_protocol::{
    BoardMatrix, BoardPiece, Color, Hands, MoveDescriptor, PieceKind, Square,
};

use crate::RulesEngine;

/// One piece on a [`SimpleBoard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplePiece {
    pub kind: PieceKind,
    pub color: Color,
    pub promoted: bool,
}

/// The reduced game's position: cells, hands, side to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleBoard {
    /// Indexed `[rank][col]`, rank 0 at the top, col 0 at the left
    /// (file 9). Black sits at the bottom and moves toward rank 0.
    cells: [[Option<SimplePiece>; 9]; 9],
    /// Pieces in hand, `[black, white]`, kept sorted.
    hands: [Vec<PieceKind>; 2],
    to_move: Color,
}

fn hand_index(color: Color) -> usize {
    match color {
        Color::Black => 0,
        Color::White => 1,
    }
}

/// Rank direction "toward the enemy camp".
fn forward(color: Color) -> i8 {
    match color {
        Color::Black => -1,
        Color::White => 1,
    }
}

/// The rank a pawn may never end up unpromoted on (it would have no move).
fn last_rank(color: Color) -> u8 {
    match color {
        Color::Black => 0,
        Color::White => 8,
    }
}

/// The far three ranks where pawns may promote.
fn in_promotion_zone(color: Color, rank: u8) -> bool {
    match color {
        Color::Black => rank <= 2,
        Color::White => rank >= 6,
    }
}

const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const GOLD_STEPS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const ROOK_DIRS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl SimpleBoard {
    /// An empty board, black to move, empty hands.
    pub fn empty() -> Self {
        Self {
            cells: [[None; 9]; 9],
            hands: [Vec::new(), Vec::new()],
            to_move: Color::Black,
        }
    }

    /// The standard starting position of the reduced game: each side has
    /// a king on the central file, two golds beside it, a rook, and a
    /// full rank of pawns.
    pub fn initial() -> Self {
        let mut board = Self::empty();
        // White, top.
        board = board
            .place("5a", PieceKind::King, Color::White)
            .place("4a", PieceKind::Gold, Color::White)
            .place("6a", PieceKind::Gold, Color::White)
            .place("8b", PieceKind::Rook, Color::White);
        for file in 1..=9 {
            board = board.place(&format!("{file}c"), PieceKind::Pawn, Color::White);
        }
        // Black, bottom.
        board = board
            .place("5i", PieceKind::King, Color::Black)
            .place("4i", PieceKind::Gold, Color::Black)
            .place("6i", PieceKind::Gold, Color::Black)
            .place("2h", PieceKind::Rook, Color::Black);
        for file in 1..=9 {
            board = board.place(&format!("{file}g"), PieceKind::Pawn, Color::Black);
        }
        board
    }

    /// Puts an unpromoted piece on a square (chained builder, test kit
    /// convention: panics on bad notation).
    pub fn place(mut self, square: &str, kind: PieceKind, color: Color) -> Self {
        let sq: Square = square.parse().expect("valid square notation");
        self.set(
            sq,
            Some(SimplePiece {
                kind,
                color,
                promoted: false,
            }),
        );
        self
    }

    /// Puts a promoted piece on a square.
    pub fn place_promoted(mut self, square: &str, kind: PieceKind, color: Color) -> Self {
        let sq: Square = square.parse().expect("valid square notation");
        self.set(
            sq,
            Some(SimplePiece {
                kind,
                color,
                promoted: true,
            }),
        );
        self
    }

    /// Adds a piece to a color's hand.
    pub fn in_hand(mut self, color: Color, kind: PieceKind) -> Self {
        self.hands[hand_index(color)].push(kind);
        self.hands[hand_index(color)].sort();
        self
    }

    /// Sets the side to move.
    pub fn to_move(mut self, color: Color) -> Self {
        self.to_move = color;
        self
    }

    pub fn side_to_move(&self) -> Color {
        self.to_move
    }

    pub fn piece_at(&self, sq: Square) -> Option<SimplePiece> {
        self.cells[sq.rank() as usize][sq.col()]
    }

    pub fn hand(&self, color: Color) -> &[PieceKind] {
        &self.hands[hand_index(color)]
    }

    fn set(&mut self, sq: Square, piece: Option<SimplePiece>) {
        self.cells[sq.rank() as usize][sq.col()] = piece;
    }

    fn square_at(rank: i8, col: i8) -> Option<Square> {
        if !(0..9).contains(&rank) || !(0..9).contains(&col) {
            return None;
        }
        Square::new((9 - col) as u8, rank as u8).ok()
    }

    /// Squares this piece could move to, ignoring king safety. A step
    /// onto an enemy piece is a capture; own pieces block.
    fn destinations(&self, from: Square, piece: SimplePiece) -> Vec<Square> {
        let mut out = Vec::new();
        if piece.kind == PieceKind::Rook && !piece.promoted {
            for (dr, dc) in ROOK_DIRS {
                let (mut rank, mut col) = (from.rank() as i8 + dr, from.col() as i8 + dc);
                while let Some(sq) = Self::square_at(rank, col) {
                    match self.piece_at(sq) {
                        None => out.push(sq),
                        Some(other) => {
                            if other.color != piece.color {
                                out.push(sq);
                            }
                            break;
                        }
                    }
                    rank += dr;
                    col += dc;
                }
            }
            return out;
        }

        let steps: &[(i8, i8)] = match piece.kind {
            PieceKind::King => &KING_STEPS,
            PieceKind::Pawn if piece.promoted => &GOLD_STEPS,
            PieceKind::Pawn => {
                return Self::square_at(from.rank() as i8 + forward(piece.color), from.col() as i8)
                    .filter(|sq| {
                        self.piece_at(*sq)
                            .is_none_or(|other| other.color != piece.color)
                    })
                    .into_iter()
                    .collect();
            }
            // Gold, and anything else this reduced game ever puts on the
            // board, steps orthogonally.
            _ => &GOLD_STEPS,
        };
        for (dr, dc) in steps {
            if let Some(sq) = Self::square_at(from.rank() as i8 + dr, from.col() as i8 + dc) {
                if self
                    .piece_at(sq)
                    .is_none_or(|other| other.color != piece.color)
                {
                    out.push(sq);
                }
            }
        }
        out
    }

    fn pieces_of(&self, color: Color) -> Vec<(Square, SimplePiece)> {
        let mut out = Vec::new();
        for rank in 0..9i8 {
            for col in 0..9i8 {
                if let Some(sq) = Self::square_at(rank, col) {
                    if let Some(piece) = self.piece_at(sq) {
                        if piece.color == color {
                            out.push((sq, piece));
                        }
                    }
                }
            }
        }
        out
    }

    fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .into_iter()
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    fn attacked_by(&self, attacker: Color, target: Square) -> bool {
        self.pieces_of(attacker)
            .into_iter()
            .any(|(from, piece)| self.destinations(from, piece).contains(&target))
    }

    /// Whether `color`'s king is attacked. A kingless color is never in
    /// check, which keeps sparse test positions convenient.
    pub fn color_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => self.attacked_by(color.opponent(), king),
            None => false,
        }
    }

    /// All moves ignoring king safety.
    fn pseudo_moves(&self) -> Vec<MoveDescriptor> {
        let mover = self.to_move;
        let mut out = Vec::new();

        for (from, piece) in self.pieces_of(mover) {
            for to in self.destinations(from, piece) {
                let pawn = piece.kind == PieceKind::Pawn && !piece.promoted;
                if pawn && in_promotion_zone(mover, to.rank()) {
                    out.push(MoveDescriptor::Board {
                        from,
                        to,
                        promote: true,
                    });
                    // On the last rank promotion is mandatory.
                    if to.rank() != last_rank(mover) {
                        out.push(MoveDescriptor::Board {
                            from,
                            to,
                            promote: false,
                        });
                    }
                } else {
                    out.push(MoveDescriptor::Board {
                        from,
                        to,
                        promote: false,
                    });
                }
            }
        }

        let mut kinds = self.hands[hand_index(mover)].clone();
        kinds.dedup();
        for kind in kinds {
            for rank in 0..9u8 {
                if kind == PieceKind::Pawn && rank == last_rank(mover) {
                    continue;
                }
                for col in 0..9i8 {
                    if let Some(sq) = Self::square_at(rank as i8, col) {
                        if self.piece_at(sq).is_none() {
                            out.push(MoveDescriptor::Drop { piece: kind, to: sq });
                        }
                    }
                }
            }
        }
        out
    }

    /// Executes a pseudo-legal move without checking king safety.
    fn apply_unchecked(&self, mv: &MoveDescriptor) -> Self {
        let mut next = self.clone();
        let mover = self.to_move;
        match *mv {
            MoveDescriptor::Board { from, to, promote } => {
                let mut piece = match next.piece_at(from) {
                    Some(piece) => piece,
                    None => return next,
                };
                next.set(from, None);
                if let Some(captured) = next.piece_at(to) {
                    // Captures drop their promotion and join the hand.
                    let hand = &mut next.hands[hand_index(mover)];
                    hand.push(captured.kind);
                    hand.sort();
                }
                if promote {
                    piece.promoted = true;
                }
                next.set(to, Some(piece));
            }
            MoveDescriptor::Drop { piece, to } => {
                let hand = &mut next.hands[hand_index(mover)];
                if let Some(pos) = hand.iter().position(|k| *k == piece) {
                    hand.remove(pos);
                }
                next.set(
                    to,
                    Some(SimplePiece {
                        kind: piece,
                        color: mover,
                        promoted: false,
                    }),
                );
            }
        }
        next.to_move = mover.opponent();
        next
    }

    /// All legal moves: pseudo moves that do not leave the mover's king
    /// attacked.
    pub fn legal_moves(&self) -> Vec<MoveDescriptor> {
        let mover = self.to_move;
        self.pseudo_moves()
            .into_iter()
            .filter(|mv| !self.apply_unchecked(mv).color_in_check(mover))
            .collect()
    }
}

/// The reduced rules oracle.
pub struct SimpleRules;

impl RulesEngine for SimpleRules {
    type State = SimpleBoard;

    fn initial() -> SimpleBoard {
        SimpleBoard::initial()
    }

    fn legal_moves(state: &SimpleBoard) -> Vec<MoveDescriptor> {
        state.legal_moves()
    }

    fn apply(state: &SimpleBoard, mv: &MoveDescriptor) -> Option<SimpleBoard> {
        if state.legal_moves().contains(mv) {
            Some(state.apply_unchecked(mv))
        } else {
            None
        }
    }

    fn is_check(state: &SimpleBoard) -> bool {
        state.color_in_check(state.to_move)
    }

    fn is_checkmate(state: &SimpleBoard) -> bool {
        Self::is_check(state) && state.legal_moves().is_empty()
    }

    fn display(state: &SimpleBoard) -> BoardMatrix {
        let mut matrix = BoardMatrix::empty();
        for rank in 0..9i8 {
            for col in 0..9i8 {
                if let Some(sq) = SimpleBoard::square_at(rank, col) {
                    if let Some(piece) = state.piece_at(sq) {
                        matrix.set(
                            sq,
                            Some(BoardPiece {
                                kind: piece.kind,
                                promoted: piece.promoted,
                                color: piece.color,
                            }),
                        );
                    }
                }
            }
        }
        matrix
    }

    fn hands(state: &SimpleBoard) -> Hands {
        Hands {
            black: state.hand(Color::Black).to_vec(),
            white: state.hand(Color::White).to_vec(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(text: &str) -> MoveDescriptor {
        text.parse().expect("valid notation")
    }

    // =====================================================================
    // Movement
    // =====================================================================

    #[test]
    fn test_initial_position_has_both_armies() {
        let board = SimpleBoard::initial();
        // 1 king + 2 golds + 1 rook + 9 pawns per side.
        assert_eq!(board.pieces_of(Color::Black).len(), 13);
        assert_eq!(board.pieces_of(Color::White).len(), 13);
        assert_eq!(board.side_to_move(), Color::Black);
    }

    #[test]
    fn test_pawn_advance_from_initial_is_legal() {
        let board = SimpleBoard::initial();
        assert!(board.legal_moves().contains(&mv("7g7f")));
    }

    #[test]
    fn test_pawn_cannot_move_backward() {
        let board = SimpleBoard::initial();
        assert!(!board.legal_moves().contains(&mv("7g7h")));
    }

    #[test]
    fn test_rook_slides_until_blocked() {
        let board = SimpleBoard::empty().place("5e", PieceKind::Rook, Color::Black);
        let moves = board.legal_moves();
        // Open file: the rook reaches both edges.
        assert!(moves.contains(&mv("5e5a")));
        assert!(moves.contains(&mv("5e5i")));
        assert!(moves.contains(&mv("5e1e")));
        assert!(moves.contains(&mv("5e9e")));

        let blocked = SimpleBoard::empty()
            .place("5e", PieceKind::Rook, Color::Black)
            .place("5c", PieceKind::Pawn, Color::Black);
        let moves = blocked.legal_moves();
        assert!(moves.contains(&mv("5e5d")));
        // Own pawn on 5c blocks the rest of the file.
        assert!(!moves.contains(&mv("5e5c")));
        assert!(!moves.contains(&mv("5e5a")));
    }

    #[test]
    fn test_capture_moves_piece_to_hand_as_base_kind() {
        let board = SimpleBoard::empty()
            .place("5e", PieceKind::Rook, Color::Black)
            .place_promoted("5c", PieceKind::Pawn, Color::White);

        let next = board.apply_unchecked(&mv("5e5c"));

        assert_eq!(next.hand(Color::Black), &[PieceKind::Pawn]);
        let occupant = next.piece_at("5c".parse().unwrap()).unwrap();
        assert_eq!(occupant.kind, PieceKind::Rook);
        assert_eq!(occupant.color, Color::Black);
        assert_eq!(next.side_to_move(), Color::White);
    }

    // =====================================================================
    // Promotion
    // =====================================================================

    #[test]
    fn test_pawn_promotion_optional_in_zone() {
        let board = SimpleBoard::empty().place("5c", PieceKind::Pawn, Color::Black);
        let moves = board.legal_moves();
        assert!(moves.contains(&mv("5c5b+")));
        assert!(moves.contains(&mv("5c5b")));
    }

    #[test]
    fn test_pawn_promotion_forced_on_last_rank() {
        let board = SimpleBoard::empty().place("5b", PieceKind::Pawn, Color::Black);
        let moves = board.legal_moves();
        assert!(moves.contains(&mv("5b5a+")));
        assert!(!moves.contains(&mv("5b5a")));
    }

    #[test]
    fn test_promoted_pawn_steps_like_gold() {
        let board = SimpleBoard::empty().place_promoted("5e", PieceKind::Pawn, Color::Black);
        let moves = board.legal_moves();
        assert!(moves.contains(&mv("5e5d")));
        assert!(moves.contains(&mv("5e5f")));
        assert!(moves.contains(&mv("5e4e")));
        assert!(moves.contains(&mv("5e6e")));
        assert_eq!(moves.len(), 4);
    }

    // =====================================================================
    // Drops
    // =====================================================================

    #[test]
    fn test_drop_onto_empty_square_is_legal() {
        let board = SimpleBoard::empty().in_hand(Color::Black, PieceKind::Pawn);
        let moves = board.legal_moves();
        assert!(moves.contains(&mv("P*5e")));
    }

    #[test]
    fn test_drop_onto_occupied_square_is_illegal() {
        let board = SimpleBoard::empty()
            .place("5e", PieceKind::Gold, Color::White)
            .in_hand(Color::Black, PieceKind::Pawn);
        assert!(!board.legal_moves().contains(&mv("P*5e")));
    }

    #[test]
    fn test_pawn_cannot_drop_on_last_rank() {
        let board = SimpleBoard::empty().in_hand(Color::Black, PieceKind::Pawn);
        let moves = board.legal_moves();
        assert!(!moves.contains(&mv("P*5a")));
        assert!(moves.contains(&mv("P*5b")));
    }

    #[test]
    fn test_drop_consumes_exactly_one_hand_piece() {
        let board = SimpleBoard::empty()
            .in_hand(Color::Black, PieceKind::Pawn)
            .in_hand(Color::Black, PieceKind::Pawn);

        let next = board.apply_unchecked(&mv("P*5e"));

        assert_eq!(next.hand(Color::Black), &[PieceKind::Pawn]);
    }

    // =====================================================================
    // Check and checkmate
    // =====================================================================

    #[test]
    fn test_rook_gives_check_down_an_open_file() {
        let board = SimpleBoard::empty()
            .place("5a", PieceKind::King, Color::White)
            .place("5i", PieceKind::Rook, Color::Black)
            .to_move(Color::White);
        assert!(SimpleRules::is_check(&board));
        assert!(!SimpleRules::is_checkmate(&board));
    }

    #[test]
    fn test_pinned_gold_cannot_step_off_the_file() {
        let board = SimpleBoard::empty()
            .place("5i", PieceKind::King, Color::Black)
            .place("5e", PieceKind::Gold, Color::Black)
            .place("5a", PieceKind::Rook, Color::White);
        let moves = board.legal_moves();
        // Stepping sideways exposes the king to the rook on 5a.
        assert!(!moves.contains(&mv("5e4e")));
        assert!(!moves.contains(&mv("5e6e")));
        // Sliding along the pin stays legal.
        assert!(moves.contains(&mv("5e5d")));
        assert!(moves.contains(&mv("5e5f")));
    }

    #[test]
    fn test_two_rook_corner_mate() {
        // White king on 1a; one black rook seals rank b, the other swings
        // to rank a for mate.
        let board = SimpleBoard::empty()
            .place("1a", PieceKind::King, Color::White)
            .place("9b", PieceKind::Rook, Color::Black)
            .place("5e", PieceKind::Rook, Color::Black)
            .place("5i", PieceKind::King, Color::Black);

        assert!(board.legal_moves().contains(&mv("5e5a")));
        let next = board.apply_unchecked(&mv("5e5a"));

        assert!(SimpleRules::is_check(&next));
        assert!(SimpleRules::is_checkmate(&next));
    }

    #[test]
    fn test_apply_refuses_illegal_moves() {
        let board = SimpleBoard::initial();
        // Moving a pawn two squares is never legal here.
        assert!(SimpleRules::apply(&board, &mv("7g7e")).is_none());
        // A legal move applies.
        assert!(SimpleRules::apply(&board, &mv("7g7f")).is_some());
    }

    // =====================================================================
    // Display and hands
    // =====================================================================

    #[test]
    fn test_display_reflects_cells() {
        let board = SimpleBoard::empty().place_promoted("7f", PieceKind::Pawn, Color::Black);
        let matrix = SimpleRules::display(&board);
        let cell = matrix.cell("7f".parse().unwrap()).unwrap();
        assert_eq!(cell.kind, PieceKind::Pawn);
        assert!(cell.promoted);
        assert_eq!(cell.color, Color::Black);
        assert_eq!(matrix.cell("7e".parse().unwrap()), None);
    }

    #[test]
    fn test_hands_report_both_colors() {
        let board = SimpleBoard::empty()
            .in_hand(Color::Black, PieceKind::Rook)
            .in_hand(Color::Black, PieceKind::Pawn)
            .in_hand(Color::White, PieceKind::Gold);
        let hands = SimpleRules::hands(&board);
        assert_eq!(hands.black, vec![PieceKind::Pawn, PieceKind::Rook]);
        assert_eq!(hands.white, vec![PieceKind::Gold]);
    }
}
