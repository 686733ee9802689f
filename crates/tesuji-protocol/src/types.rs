//! Core types shared by every Tesuji layer.
//!
//! Everything here is plain data: identities, board vocabulary, and the
//! session-level records that travel between the coordinator and its
//! clients. No I/O, no game rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::NotationError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player identity as chosen at login.
///
/// Newtype over `String` so a player id can't be confused with any other
/// free-form text (comments, notation, file names). Serializes as the bare
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Convenience constructor for string literals.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The identity of one session: the ordered pair of its two players.
///
/// `host` initiated the pairing, `guest` accepted it. The pair is ordered,
/// so `(a, b)` and `(b, a)` are different keys. At most one live session
/// exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub host: PlayerId,
    pub guest: PlayerId,
}

impl SessionKey {
    pub fn new(host: impl Into<PlayerId>, guest: impl Into<PlayerId>) -> Self {
        Self {
            host: host.into(),
            guest: guest.into(),
        }
    }

    /// Returns the player occupying the given side.
    pub fn player(&self, side: Side) -> &PlayerId {
        match side {
            Side::Host => &self.host,
            Side::Guest => &self.guest,
        }
    }

    /// Returns the side a player occupies, if they are part of this key.
    pub fn side_of(&self, player: &PlayerId) -> Option<Side> {
        if *player == self.host {
            Some(Side::Host)
        } else if *player == self.guest {
            Some(Side::Guest)
        } else {
            None
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.host, self.guest)
    }
}

/// One of the two seats in a session.
///
/// Deliberately independent of board color: which seat plays black is
/// decided by the session's `first_mover`, and may change on a forced
/// reset with seat swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Host,
    Guest,
}

impl Side {
    /// The other seat.
    pub fn opponent(self) -> Self {
        match self {
            Self::Host => Self::Guest,
            Self::Guest => Self::Host,
        }
    }

    /// Board color for this seat, given which seat moves first.
    /// The first mover always plays black.
    pub fn color(self, first_mover: Side) -> Color {
        if self == first_mover {
            Color::Black
        } else {
            Color::White
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Guest => write!(f, "guest"),
        }
    }
}

/// Board orientation color. Black moves first and sits at the bottom of
/// the display matrix (high ranks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    /// The seat holding this color, given which seat moves first.
    pub fn side(self, first_mover: Side) -> Side {
        match self {
            Self::Black => first_mover,
            Self::White => first_mover.opponent(),
        }
    }
}

// ---------------------------------------------------------------------------
// Board vocabulary
// ---------------------------------------------------------------------------

/// A square on the 9x9 board.
///
/// Files run 1..=9 from the right edge, ranks run 'a'..='i' from the top,
/// matching the canonical notation ("7f" is file 7, rank 'f'). Internally
/// the rank is stored as 0..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Builds a square from a file (1..=9) and rank index (0..=8).
    pub fn new(file: u8, rank: u8) -> Result<Self, NotationError> {
        if !(1..=9).contains(&file) || rank > 8 {
            return Err(NotationError::SquareOutOfRange(format!(
                "file {file}, rank {rank}"
            )));
        }
        Ok(Self { file, rank })
    }

    /// Builds a square from a flat cell index in 0..=80.
    ///
    /// Index 0 is the top-left display cell (file 9, rank 'a'); indices
    /// advance left to right, top to bottom.
    pub fn from_index(index: i64) -> Result<Self, NotationError> {
        if !(0..=80).contains(&index) {
            return Err(NotationError::IndexOutOfRange(index));
        }
        let rank = (index / 9) as u8;
        let col = (index % 9) as u8;
        Ok(Self {
            file: 9 - col,
            rank,
        })
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    /// Column in the display matrix (0 = leftmost = file 9).
    pub fn col(self) -> usize {
        (9 - self.file) as usize
    }

    /// Flat cell index in 0..=80.
    pub fn index(self) -> usize {
        self.rank as usize * 9 + self.col()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file, (b'a' + self.rank) as char)
    }
}

impl std::str::FromStr for Square {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file_ch), Some(rank_ch), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(NotationError::SquareOutOfRange(s.to_string()));
        };
        let file = file_ch
            .to_digit(10)
            .filter(|d| (1..=9).contains(d))
            .ok_or_else(|| NotationError::SquareOutOfRange(s.to_string()))?;
        if !('a'..='i').contains(&rank_ch) {
            return Err(NotationError::SquareOutOfRange(s.to_string()));
        }
        Ok(Self {
            file: file as u8,
            rank: rank_ch as u8 - b'a',
        })
    }
}

/// The eight base piece kinds, named by their canonical letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Lance,
    Knight,
    Silver,
    Gold,
    Bishop,
    Rook,
    King,
}

impl PieceKind {
    /// Canonical uppercase letter ("P", "L", ...).
    pub fn letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Lance => 'L',
            Self::Knight => 'N',
            Self::Silver => 'S',
            Self::Gold => 'G',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::King => 'K',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(Self::Pawn),
            'L' => Some(Self::Lance),
            'N' => Some(Self::Knight),
            'S' => Some(Self::Silver),
            'G' => Some(Self::Gold),
            'B' => Some(Self::Bishop),
            'R' => Some(Self::Rook),
            'K' => Some(Self::King),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// One occupied cell of the display matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPiece {
    pub kind: PieceKind,
    pub promoted: bool,
    pub color: Color,
}

/// A rules-engine-agnostic 9x9 display board.
///
/// Indexed `[rank][col]` with rank 0 at the top and col 0 at the left
/// (file 9). This is the only board representation that crosses the
/// coordinator boundary; the engine's internal state never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMatrix(pub [[Option<BoardPiece>; 9]; 9]);

impl BoardMatrix {
    /// An empty board.
    pub fn empty() -> Self {
        Self([[None; 9]; 9])
    }

    pub fn cell(&self, sq: Square) -> Option<BoardPiece> {
        self.0[sq.rank() as usize][sq.col()]
    }

    pub fn set(&mut self, sq: Square, piece: Option<BoardPiece>) {
        self.0[sq.rank() as usize][sq.col()] = piece;
    }
}

impl Default for BoardMatrix {
    fn default() -> Self {
        Self::empty()
    }
}

/// Pieces in hand, keyed by board color. Produced by the rules engine;
/// the coordinator maps this to seat-keyed [`CapturedPieces`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hands {
    pub black: Vec<PieceKind>,
    pub white: Vec<PieceKind>,
}

/// Captured-piece multisets keyed by seat, kept sorted for stable
/// comparison and display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPieces {
    pub host: Vec<PieceKind>,
    pub guest: Vec<PieceKind>,
}

impl CapturedPieces {
    /// Reassigns color-keyed hands to seats through the first mover.
    pub fn from_hands(hands: Hands, first_mover: Side) -> Self {
        let mut black = hands.black;
        let mut white = hands.white;
        black.sort();
        white.sort();
        match first_mover {
            Side::Host => Self {
                host: black,
                guest: white,
            },
            Side::Guest => Self {
                host: white,
                guest: black,
            },
        }
    }

    pub fn of(&self, side: Side) -> &[PieceKind] {
        match side {
            Side::Host => &self.host,
            Side::Guest => &self.guest,
        }
    }
}

// ---------------------------------------------------------------------------
// Session vocabulary
// ---------------------------------------------------------------------------

/// Lifecycle status of a session.
///
/// Moves forward only (`Accepted` -> `Ongoing` -> `Ended`), except that a
/// completed reset returns an ended or ongoing session to `Ongoing` under
/// a fresh epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Pairing accepted, game not yet started.
    Accepted,
    /// Game in progress.
    Ongoing,
    /// Game over; winner and end reason are set and immutable until an
    /// explicit reset.
    Ended,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Ongoing => write!(f, "ongoing"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Checkmate,
    Resignation,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkmate => write!(f, "checkmate"),
            Self::Resignation => write!(f, "resignation"),
        }
    }
}

/// One applied move in a session's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Position in the log (0-based); equals the move count before this
    /// move was applied.
    pub index: usize,
    /// The seat that submitted the move.
    pub mover: Side,
    /// The canonical descriptor.
    pub descriptor: crate::MoveDescriptor,
    /// Canonical text form, kept alongside the descriptor so logs and
    /// snapshots are replayable without re-deriving notation.
    pub notation: String,
}

impl MoveRecord {
    pub fn new(index: usize, mover: Side, descriptor: crate::MoveDescriptor) -> Self {
        let notation = descriptor.to_string();
        Self {
            index,
            mover,
            descriptor,
            notation,
        }
    }
}

/// A pending reset negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    pub requested_by: Side,
    pub comment: String,
    /// Set once the other side accepts. An accepted request survives only
    /// until the next poll delivers the resync notice.
    pub accepted: bool,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().expect("valid square")
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }

    #[test]
    fn test_session_key_display() {
        let key = SessionKey::new("alice", "bob");
        assert_eq!(key.to_string(), "alice vs bob");
    }

    #[test]
    fn test_session_key_side_of_both_players() {
        let key = SessionKey::new("alice", "bob");
        assert_eq!(key.side_of(&PlayerId::new("alice")), Some(Side::Host));
        assert_eq!(key.side_of(&PlayerId::new("bob")), Some(Side::Guest));
        assert_eq!(key.side_of(&PlayerId::new("carol")), None);
    }

    #[test]
    fn test_side_opponent_is_involution() {
        assert_eq!(Side::Host.opponent(), Side::Guest);
        assert_eq!(Side::Guest.opponent().opponent(), Side::Guest);
    }

    #[test]
    fn test_side_color_follows_first_mover() {
        assert_eq!(Side::Host.color(Side::Host), Color::Black);
        assert_eq!(Side::Guest.color(Side::Host), Color::White);
        assert_eq!(Side::Host.color(Side::Guest), Color::White);
        assert_eq!(Color::Black.side(Side::Guest), Side::Guest);
    }

    // =====================================================================
    // Square
    // =====================================================================

    #[test]
    fn test_square_parse_and_display_round_trip() {
        for text in ["1a", "9i", "7f", "5e"] {
            assert_eq!(sq(text).to_string(), text);
        }
    }

    #[test]
    fn test_square_parse_rejects_out_of_range() {
        assert!("0a".parse::<Square>().is_err());
        assert!("7j".parse::<Square>().is_err());
        assert!("77".parse::<Square>().is_err());
        assert!("7ff".parse::<Square>().is_err());
        assert!("".parse::<Square>().is_err());
    }

    #[test]
    fn test_square_index_round_trip() {
        // Index 0 is the top-left cell: file 9, rank 'a'.
        assert_eq!(Square::from_index(0).unwrap().to_string(), "9a");
        // Index 80 is the bottom-right cell: file 1, rank 'i'.
        assert_eq!(Square::from_index(80).unwrap().to_string(), "1i");
        for index in [0i64, 1, 8, 9, 40, 79, 80] {
            let square = Square::from_index(index).unwrap();
            assert_eq!(square.index() as i64, index);
        }
    }

    #[test]
    fn test_square_from_index_rejects_out_of_range() {
        assert!(Square::from_index(-1).is_err());
        assert!(Square::from_index(81).is_err());
    }

    // =====================================================================
    // Piece kinds and captured sets
    // =====================================================================

    #[test]
    fn test_piece_kind_letter_round_trip() {
        for kind in [
            PieceKind::Pawn,
            PieceKind::Lance,
            PieceKind::Knight,
            PieceKind::Silver,
            PieceKind::Gold,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::King,
        ] {
            assert_eq!(PieceKind::from_letter(kind.letter()), Some(kind));
        }
        assert_eq!(PieceKind::from_letter('Z'), None);
    }

    #[test]
    fn test_captured_pieces_from_hands_maps_black_to_first_mover() {
        let hands = Hands {
            black: vec![PieceKind::Rook, PieceKind::Pawn],
            white: vec![PieceKind::Gold],
        };
        let captured = CapturedPieces::from_hands(hands.clone(), Side::Host);
        // Sorted, and black belongs to the first mover.
        assert_eq!(captured.host, vec![PieceKind::Pawn, PieceKind::Rook]);
        assert_eq!(captured.guest, vec![PieceKind::Gold]);

        let flipped = CapturedPieces::from_hands(hands, Side::Guest);
        assert_eq!(flipped.guest, vec![PieceKind::Pawn, PieceKind::Rook]);
        assert_eq!(flipped.host, vec![PieceKind::Gold]);
    }

    // =====================================================================
    // Board matrix
    // =====================================================================

    #[test]
    fn test_board_matrix_set_and_cell() {
        let mut board = BoardMatrix::empty();
        let piece = BoardPiece {
            kind: PieceKind::Gold,
            promoted: false,
            color: Color::White,
        };
        board.set(sq("5e"), Some(piece));
        assert_eq!(board.cell(sq("5e")), Some(piece));
        assert_eq!(board.cell(sq("5d")), None);
    }

    #[test]
    fn test_board_matrix_json_round_trip() {
        let mut board = BoardMatrix::empty();
        board.set(
            sq("7f"),
            Some(BoardPiece {
                kind: PieceKind::Pawn,
                promoted: true,
                color: Color::Black,
            }),
        );
        let bytes = serde_json::to_vec(&board).unwrap();
        let decoded: BoardMatrix = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(board, decoded);
    }

    // =====================================================================
    // Session vocabulary
    // =====================================================================

    #[test]
    fn test_session_status_is_terminal() {
        assert!(!SessionStatus::Accepted.is_terminal());
        assert!(!SessionStatus::Ongoing.is_terminal());
        assert!(SessionStatus::Ended.is_terminal());
    }

    #[test]
    fn test_move_record_carries_canonical_notation() {
        let descriptor: crate::MoveDescriptor = "7g7f".parse().unwrap();
        let record = MoveRecord::new(0, Side::Host, descriptor);
        assert_eq!(record.notation, "7g7f");
        assert_eq!(record.index, 0);
    }
}
