use chess_core::MoveInputError;
use thiserror::Error;

use crate::coordinator::Phase;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Input(#[from] MoveInputError),
    #[error("not accepting moves while {0}")]
    NotAwaitingMove(Phase),
    #[error("could not start the self-play trainer: {0}")]
    TrainerSpawn(#[from] std::io::Error),
}
