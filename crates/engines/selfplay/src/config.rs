use std::time::Duration;

use chess_core::SearchLimits;
use serde::{Deserialize, Serialize};

/// Self-play parameters. Every field has a default, so a partial TOML
/// section is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Step size of each evaluator update, in `(0, 1]`.
    pub learning_rate: f32,
    /// Probability of a uniformly random move at each self-play ply.
    pub epsilon: f64,
    /// TD(λ) blend between the successor prediction and the longer return.
    pub lambda: f32,
    /// Discount per ply.
    pub gamma: f32,
    /// Number of best-scored moves the softmax samples from.
    pub top_k: usize,
    pub temperature: f32,
    /// Plies after which an episode is cut off and scored as a draw.
    pub ply_cap: usize,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Capacity of the progress channel.
    pub progress_capacity: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epsilon: 0.1,
            lambda: 0.7,
            gamma: 0.99,
            top_k: 3,
            temperature: 0.1,
            ply_cap: 120,
            seed: None,
            progress_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub move_time_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            move_time_ms: 2000,
        }
    }
}

impl SearchConfig {
    pub fn move_time(&self) -> Duration {
        Duration::from_millis(self.move_time_ms)
    }

    /// Fresh limits for one engine turn.
    pub fn limits(&self) -> SearchLimits {
        SearchLimits::depth_and_time(self.max_depth, self.move_time())
    }
}
