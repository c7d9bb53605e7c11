//! Chess rules for the learning opponent: positions, legal move generation,
//! game status, notation and search limits.
//!
//! Positions are immutable values. Everything above this crate (search,
//! self-play, the game coordinator) works on clones and never needs
//! make/unmake bookkeeping.

pub mod board;
pub mod error;
pub mod movegen;
pub mod notation;
pub mod perft;
pub mod status;
pub mod time_control;
pub mod types;
pub mod zobrist;

pub use board::*;
pub use error::*;
pub use movegen::*;
pub use notation::*;
pub use perft::{divide, perft};
pub use status::*;
pub use time_control::*;
pub use types::*;
pub use zobrist::ZOBRIST;
