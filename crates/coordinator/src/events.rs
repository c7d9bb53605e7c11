//! Everything a renderer needs, as a flat stream of serializable events.

use chess_core::{Color, GameStatus, Position};
use selfplay_engine::{EpisodeOutcome, SearchOutcome, Thought, TrainingProgress};
use serde::Serialize;

use crate::coordinator::Phase;
use crate::game::MoveRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayEvent {
    Phase {
        phase: Phase,
    },
    Board {
        fen: String,
        /// Rank 8 first.
        rows: Vec<String>,
        side_to_move: Color,
    },
    HistoryEntry {
        ply: usize,
        side: Color,
        /// Coordinate form, e.g. `e7e8q`.
        mv: String,
        san: String,
        by_engine: bool,
    },
    /// A root move score from the running search.
    Thought {
        depth: u8,
        mv: String,
        score: f32,
    },
    Confidence {
        mv: String,
        confidence: f32,
        score: f32,
        depth: u8,
        nodes: u64,
        /// Expected continuation in coordinate form, `mv` first.
        line: Vec<String>,
    },
    Training {
        episodes: u64,
        last_outcome: EpisodeOutcome,
        last_plies: usize,
    },
    Notice {
        message: String,
    },
    GameOver {
        status: GameStatus,
        winner: Option<Color>,
        message: String,
        movetext: String,
    },
}

impl DisplayEvent {
    pub fn board(pos: &Position) -> Self {
        DisplayEvent::Board {
            fen: pos.to_fen(),
            rows: pos.text_rows(),
            side_to_move: pos.side_to_move,
        }
    }

    pub fn history(record: &MoveRecord) -> Self {
        DisplayEvent::HistoryEntry {
            ply: record.ply,
            side: record.side,
            mv: record.mv.to_string(),
            san: record.san.clone(),
            by_engine: record.by_engine,
        }
    }

    pub fn thought(thought: &Thought) -> Self {
        DisplayEvent::Thought {
            depth: thought.depth,
            mv: thought.mv.to_string(),
            score: thought.score,
        }
    }

    pub fn confidence(outcome: &SearchOutcome) -> Self {
        DisplayEvent::Confidence {
            mv: outcome.best_move.to_string(),
            confidence: outcome.confidence,
            score: outcome.score,
            depth: outcome.depth,
            nodes: outcome.nodes,
            line: outcome.pv.iter().map(|mv| mv.to_string()).collect(),
        }
    }

    pub fn training(progress: &TrainingProgress) -> Self {
        DisplayEvent::Training {
            episodes: progress.episodes,
            last_outcome: progress.last_outcome,
            last_plies: progress.last_plies,
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        DisplayEvent::Notice {
            message: message.into(),
        }
    }

    pub fn game_over(status: GameStatus, movetext: String) -> Self {
        DisplayEvent::GameOver {
            status,
            winner: status.winner(),
            message: status.to_string(),
            movetext,
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod events_tests;
