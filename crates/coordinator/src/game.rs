//! The real game: every position reached, the moves that led there and the
//! repetition keys used to detect draws.

use chess_core::{
    Color, GameStatus, IllegalMoveError, Move, MoveInputError, Position, game_status,
    parse_move_input, san,
};
use selfplay_engine::LivePosition;

/// A move as it was played, with its SAN text fixed at the time.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    /// 1-based half-move number.
    pub ply: usize,
    pub side: Color,
    pub mv: Move,
    pub san: String,
    pub by_engine: bool,
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Index 0 is the start position; never empty.
    positions: Vec<Position>,
    records: Vec<MoveRecord>,
    /// One key per entry of `positions`.
    keys: Vec<u64>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Position::startpos())
    }
}

impl GameState {
    pub fn new(start: Position) -> Self {
        let key = start.position_hash();
        Self {
            positions: vec![start],
            records: Vec::new(),
            keys: vec![key],
        }
    }

    pub fn position(&self) -> &Position {
        // `positions` always holds the start position.
        &self.positions[self.positions.len() - 1]
    }

    pub fn start_position(&self) -> &Position {
        &self.positions[0]
    }

    pub fn side_to_move(&self) -> Color {
        self.position().side_to_move
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn ply_count(&self) -> usize {
        self.records.len()
    }

    /// Repetition keys of the positions before the current one.
    pub fn history(&self) -> &[u64] {
        &self.keys[..self.keys.len() - 1]
    }

    pub fn status(&self) -> GameStatus {
        game_status(self.position(), self.history())
    }

    /// Snapshot handed to the self-play trainer.
    pub fn live(&self) -> LivePosition {
        LivePosition {
            position: self.position().clone(),
            history: self.history().to_vec(),
        }
    }

    /// Plays `mv` if it is legal in the current position.
    pub fn apply_move(
        &mut self,
        mv: Move,
        by_engine: bool,
    ) -> Result<MoveRecord, IllegalMoveError> {
        let current = self.position();
        let next = current.apply(mv)?;
        let record = MoveRecord {
            ply: self.records.len() + 1,
            side: current.side_to_move,
            mv,
            san: san(current, mv),
            by_engine,
        };

        self.keys.push(next.position_hash());
        self.positions.push(next);
        self.records.push(record.clone());
        Ok(record)
    }

    /// Parses a human move like `e2 e4` and plays it.
    pub fn apply_input(&mut self, text: &str) -> Result<MoveRecord, MoveInputError> {
        let mv = parse_move_input(self.position(), text)?;
        Ok(self.apply_move(mv, false)?)
    }

    /// Move list in numbered SAN, e.g. `1. e4 e5 2. Nf3`.
    pub fn movetext(&self) -> String {
        let start = self.start_position();
        let mut out = Vec::with_capacity(self.records.len() + self.records.len() / 2 + 1);
        let mut number = start.fullmove_number;
        for (i, record) in self.records.iter().enumerate() {
            match record.side {
                Color::White => out.push(format!("{number}.")),
                Color::Black if i == 0 => out.push(format!("{number}...")),
                Color::Black => {}
            }
            out.push(record.san.clone());
            if record.side == Color::Black {
                number += 1;
            }
        }
        out.join(" ")
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
