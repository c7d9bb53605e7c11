//! Game-ending conditions.

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::movegen::has_legal_move;
use crate::types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "loser", rename_all = "snake_case")]
pub enum GameStatus {
    Ongoing,
    /// Holds the side that has been mated.
    Checkmate(Color),
    Stalemate,
    DrawByRepetition,
    DrawByFiftyMove,
    DrawByInsufficientMaterial,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }

    pub fn is_draw(self) -> bool {
        !matches!(self, GameStatus::Ongoing | GameStatus::Checkmate(_))
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameStatus::Checkmate(loser) => Some(loser.other()),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Ongoing => write!(f, "in progress"),
            GameStatus::Checkmate(loser) => write!(f, "checkmate, {} wins", loser.other()),
            GameStatus::Stalemate => write!(f, "draw by stalemate"),
            GameStatus::DrawByRepetition => write!(f, "draw by threefold repetition"),
            GameStatus::DrawByFiftyMove => write!(f, "draw by the fifty-move rule"),
            GameStatus::DrawByInsufficientMaterial => write!(f, "draw by insufficient material"),
        }
    }
}

/// Status of `pos` given the repetition keys of the positions that preceded
/// it in the game (oldest first, `pos` itself not included).
///
/// Mate and stalemate are checked first, so a mating move that also completes
/// a repetition or reaches the fifty-move limit still wins.
pub fn game_status(pos: &Position, history: &[u64]) -> GameStatus {
    if !has_legal_move(pos) {
        return if pos.in_check(pos.side_to_move) {
            GameStatus::Checkmate(pos.side_to_move)
        } else {
            GameStatus::Stalemate
        };
    }
    if pos.is_fifty_move_draw() {
        return GameStatus::DrawByFiftyMove;
    }
    if is_threefold(pos.position_hash(), history) {
        return GameStatus::DrawByRepetition;
    }
    if pos.is_insufficient_material() {
        return GameStatus::DrawByInsufficientMaterial;
    }
    GameStatus::Ongoing
}

/// True when `key` already occurred twice in `history`.
pub fn is_threefold(key: u64, history: &[u64]) -> bool {
    history.iter().filter(|&&k| k == key).count() >= 2
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
