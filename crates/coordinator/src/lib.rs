//! Game coordination for the self-play chess program.
//!
//! The [`Coordinator`] owns the real game and drives it through its phases,
//! starting a background trainer for every game and running the move search
//! on a blocking task when the engine has the move. Everything a front end
//! needs to show arrives as [`DisplayEvent`]s.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod game;

pub use config::{AppConfig, ConfigError};
pub use coordinator::{ABOUT_TEXT, Control, Coordinator, Phase, Turn};
pub use error::CoordinatorError;
pub use events::DisplayEvent;
pub use game::{GameState, MoveRecord};
pub use selfplay_engine::{EpisodeOutcome, SearchConfig, TrainingConfig};
