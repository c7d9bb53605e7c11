//! Self-Play Chess Engine
//!
//! An opponent that knows nothing but material at the start of a game and
//! learns while it is played:
//!
//! - [`evaluator`]: a linear value function over sparse position features,
//!   shared between the trainer and the search.
//! - [`trainer`]: background self-play from the live position with TD(λ)
//!   updates.
//! - [`search`]: iterative-deepening alpha-beta that turns evaluator values
//!   into a move, a confidence figure and a thinking trace.
//!
//! Nothing learned here outlives the game.

pub mod config;
pub mod evaluator;
pub mod features;
pub mod search;
pub mod trainer;

pub use config::{SearchConfig, TrainingConfig};
pub use evaluator::{Evaluate, Evaluator, SharedEvaluator};
pub use search::{MATE_SCORE, SearchOutcome, Thought, choose_move};
pub use trainer::{
    EpisodeOutcome, EpisodeSummary, LivePosition, Trainer, TrainerHandle, TrainingProgress,
};
