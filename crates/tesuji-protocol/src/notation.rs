//! Canonical move notation.
//!
//! A move is uniquely identified by its source (a board square or a piece
//! dropped from hand), its destination, and a promotion flag. The text
//! form is the exchange format for logs, snapshots, and replay:
//!
//! ```text
//! 7g7f      board move, file 7 rank g to file 7 rank f
//! 2b2a+     board move with promotion
//! P*5e      pawn dropped from hand onto 5e
//! ```
//!
//! Parsing and printing are bit-exact inverses of each other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{NotationError, PieceKind, Square};

// ---------------------------------------------------------------------------
// MoveDescriptor
// ---------------------------------------------------------------------------

/// A fully validated move, the form the coordinator and rules engine
/// exchange. Structurally a drop always has a piece kind and never a
/// promotion flag, so the malformed combinations of [`MoveParts`] are
/// unrepresentable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MoveDescriptor {
    /// Move a piece already on the board.
    Board {
        from: Square,
        to: Square,
        promote: bool,
    },
    /// Drop a captured piece from hand.
    Drop { piece: PieceKind, to: Square },
}

impl MoveDescriptor {
    pub fn destination(self) -> Square {
        match self {
            Self::Board { to, .. } | Self::Drop { to, .. } => to,
        }
    }

    pub fn source(self) -> Option<Square> {
        match self {
            Self::Board { from, .. } => Some(from),
            Self::Drop { .. } => None,
        }
    }

    pub fn drop_piece(self) -> Option<PieceKind> {
        match self {
            Self::Board { .. } => None,
            Self::Drop { piece, .. } => Some(piece),
        }
    }

    pub fn is_promotion(self) -> bool {
        matches!(self, Self::Board { promote: true, .. })
    }
}

impl fmt::Display for MoveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board { from, to, promote } => {
                write!(f, "{from}{to}{}", if *promote { "+" } else { "" })
            }
            Self::Drop { piece, to } => write!(f, "{piece}*{to}"),
        }
    }
}

impl FromStr for MoveDescriptor {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((piece_str, to_str)) = s.split_once('*') {
            // Drop: "P*5e". A trailing '+' is not part of the grammar.
            let mut pieces = piece_str.chars();
            let (Some(letter), None) = (pieces.next(), pieces.next()) else {
                return Err(NotationError::BadMove(s.to_string()));
            };
            let piece = PieceKind::from_letter(letter)
                .ok_or_else(|| NotationError::UnknownPiece(piece_str.to_string()))?;
            let to = to_str.parse()?;
            return Ok(Self::Drop { piece, to });
        }

        // Board move: "7g7f" with an optional trailing '+'.
        let (core, promote) = match s.strip_suffix('+') {
            Some(core) => (core, true),
            None => (s, false),
        };
        if core.len() != 4 || !core.is_ascii() {
            return Err(NotationError::BadMove(s.to_string()));
        }
        let from = core[..2].parse()?;
        let to = core[2..].parse()?;
        Ok(Self::Board { from, to, promote })
    }
}

// ---------------------------------------------------------------------------
// MoveParts
// ---------------------------------------------------------------------------

/// The loose, not-yet-validated form a client submits.
///
/// Clients address moves with an optional source square, a destination,
/// an optional drop piece, and a promotion flag. [`MoveParts::validate`]
/// turns this into a [`MoveDescriptor`] or reports exactly which
/// combination was malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveParts {
    pub from: Option<Square>,
    pub to: Square,
    pub drop: Option<PieceKind>,
    pub promote: bool,
}

impl MoveParts {
    /// A plain board move.
    pub fn board(from: Square, to: Square, promote: bool) -> Self {
        Self {
            from: Some(from),
            to,
            drop: None,
            promote,
        }
    }

    /// A drop from hand.
    pub fn drop(piece: PieceKind, to: Square) -> Self {
        Self {
            from: None,
            to,
            drop: Some(piece),
            promote: false,
        }
    }

    /// Validates the request into a canonical descriptor.
    ///
    /// A drop must name a piece kind and must not name a source square.
    /// Promotion on a drop is coerced to false rather than rejected,
    /// matching how clients historically sent the flag unconditionally.
    pub fn validate(self) -> Result<MoveDescriptor, NotationError> {
        match (self.from, self.drop) {
            (Some(from), None) => Ok(MoveDescriptor::Board {
                from,
                to: self.to,
                promote: self.promote,
            }),
            (None, Some(piece)) => Ok(MoveDescriptor::Drop {
                piece,
                to: self.to,
            }),
            (None, None) => Err(NotationError::MalformedMove(
                "a move needs a source square or a drop piece",
            )),
            (Some(_), Some(_)) => Err(NotationError::MalformedMove(
                "a move cannot both leave a square and drop from hand",
            )),
        }
    }
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
    // Canonical text round trips
    // =====================================================================

    #[test]
    fn test_descriptor_display_board_move() {
        let mv = MoveDescriptor::Board {
            from: sq("7g"),
            to: sq("7f"),
            promote: false,
        };
        assert_eq!(mv.to_string(), "7g7f");
    }

    #[test]
    fn test_descriptor_display_promotion() {
        let mv = MoveDescriptor::Board {
            from: sq("2b"),
            to: sq("2a"),
            promote: true,
        };
        assert_eq!(mv.to_string(), "2b2a+");
    }

    #[test]
    fn test_descriptor_display_drop() {
        let mv = MoveDescriptor::Drop {
            piece: PieceKind::Pawn,
            to: sq("5e"),
        };
        assert_eq!(mv.to_string(), "P*5e");
    }

    #[test]
    fn test_descriptor_parse_round_trip_is_bit_exact() {
        for text in ["7g7f", "2b2a+", "P*5e", "R*9i", "1a1b"] {
            let mv: MoveDescriptor = text.parse().expect(text);
            assert_eq!(mv.to_string(), text);
        }
    }

    #[test]
    fn test_descriptor_parse_rejects_garbage() {
        for text in ["", "7g", "7g7", "7g7f++", "X*5e", "PP*5e", "P*5j", "0a1a", "7g7f+x"] {
            assert!(text.parse::<MoveDescriptor>().is_err(), "accepted {text:?}");
        }
    }

    // =====================================================================
    // MoveParts validation
    // =====================================================================

    #[test]
    fn test_parts_board_move_validates() {
        let parts = MoveParts::board(sq("7g"), sq("7f"), false);
        let mv = parts.validate().unwrap();
        assert_eq!(mv.to_string(), "7g7f");
    }

    #[test]
    fn test_parts_drop_validates() {
        let parts = MoveParts::drop(PieceKind::Pawn, sq("5e"));
        let mv = parts.validate().unwrap();
        assert_eq!(mv.to_string(), "P*5e");
    }

    #[test]
    fn test_parts_drop_coerces_promotion_to_false() {
        // Clients send the promote flag unconditionally; a promoted drop
        // is silently normalized, not rejected.
        let parts = MoveParts {
            from: None,
            to: sq("5e"),
            drop: Some(PieceKind::Pawn),
            promote: true,
        };
        let mv = parts.validate().unwrap();
        assert!(!mv.is_promotion());
        assert_eq!(mv.to_string(), "P*5e");
    }

    #[test]
    fn test_parts_without_source_or_drop_is_malformed() {
        let parts = MoveParts {
            from: None,
            to: sq("5e"),
            drop: None,
            promote: false,
        };
        assert!(matches!(
            parts.validate(),
            Err(NotationError::MalformedMove(_))
        ));
    }

    #[test]
    fn test_parts_with_source_and_drop_is_malformed() {
        let parts = MoveParts {
            from: Some(sq("7g")),
            to: sq("5e"),
            drop: Some(PieceKind::Pawn),
            promote: false,
        };
        assert!(matches!(
            parts.validate(),
            Err(NotationError::MalformedMove(_))
        ));
    }

    // =====================================================================
    // JSON shape
    // =====================================================================

    #[test]
    fn test_descriptor_json_is_internally_tagged() {
        let mv = MoveDescriptor::Drop {
            piece: PieceKind::Pawn,
            to: sq("5e"),
        };
        let json: serde_json::Value = serde_json::to_value(mv).unwrap();
        assert_eq!(json["type"], "drop");
        assert_eq!(json["piece"], "Pawn");
    }
}
