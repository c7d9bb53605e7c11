//! Error types of the rules engine.

use thiserror::Error;

use crate::types::Move;

/// The move is not in the legal move set of the position it was played in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal move {mv} in this position")]
pub struct IllegalMoveError {
    pub mv: Move,
}

/// Move text that could not be parsed into squares.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMoveInputError {
    #[error("expected two squares like `e2 e4`, got {0} token(s)")]
    WrongTokenCount(usize),
    #[error("`{0}` is not a square between a1 and h8")]
    BadSquare(String),
    #[error("`{0}` is not a promotion piece (use q, r, b or n)")]
    BadPromotion(String),
}

/// Search was asked to move in a position without legal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no legal moves in this position")]
pub struct NoLegalMovesError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected at least 4 FEN fields, got {0}")]
    MissingFields(usize),
    #[error("board section must have 8 ranks, got {0}")]
    RankCount(usize),
    #[error("rank {rank} does not describe exactly 8 files")]
    FileCount { rank: usize },
    #[error("invalid piece character `{0}`")]
    BadPiece(char),
    #[error("invalid side to move `{0}`")]
    BadSideToMove(String),
    #[error("invalid castling field `{0}`")]
    BadCastling(String),
    #[error("invalid en passant square `{0}`")]
    BadEnPassant(String),
    #[error("invalid move counter `{0}`")]
    BadCounter(String),
    #[error("each side needs exactly one king")]
    KingCount,
    #[error("en passant square `{0}` does not follow a double pawn push")]
    ImpossibleEnPassant(String),
    #[error("the side not to move is in check")]
    OpponentInCheck,
}

/// Either half of turning user text into a legal move can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveInputError {
    #[error(transparent)]
    Invalid(#[from] InvalidMoveInputError),
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
}
