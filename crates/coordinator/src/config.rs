//! Program configuration, read from a TOML file.

use std::path::{Path, PathBuf};

use chess_core::{Color, FenError, Position};
use selfplay_engine::{SearchConfig, TrainingConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid start_fen: {0}")]
    InvalidFen(#[from] FenError),
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level settings. Missing sections and keys fall back to defaults.
///
/// ```toml
/// human_color = "black"
///
/// [search]
/// max_depth = 4
///
/// [training]
/// seed = 7
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub human_color: Color,
    /// Position new games start from; the standard start when absent.
    pub start_fen: Option<String>,
    pub search: SearchConfig,
    pub training: TrainingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            human_color: Color::White,
            start_fen: None,
            search: SearchConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn engine_color(&self) -> Color {
        self.human_color.other()
    }

    pub fn start_position(&self) -> Result<Position, ConfigError> {
        match &self.start_fen {
            Some(fen) => Ok(Position::from_fen(fen)?),
            None => Ok(Position::startpos()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.start_position()?;

        let t = &self.training;
        check(
            "training.learning_rate",
            t.learning_rate > 0.0 && t.learning_rate <= 1.0,
            "must be in (0, 1]",
        )?;
        check("training.epsilon", (0.0..=1.0).contains(&t.epsilon), "must be in [0, 1]")?;
        check("training.lambda", (0.0..=1.0).contains(&t.lambda), "must be in [0, 1]")?;
        check("training.gamma", t.gamma > 0.0 && t.gamma <= 1.0, "must be in (0, 1]")?;
        check("training.top_k", t.top_k >= 1, "must be at least 1")?;
        check("training.temperature", t.temperature > 0.0, "must be positive")?;
        check("training.ply_cap", t.ply_cap >= 1, "must be at least 1")?;
        check("training.progress_capacity", t.progress_capacity >= 1, "must be at least 1")?;
        check("search.max_depth", self.search.max_depth >= 1, "must be at least 1")?;
        Ok(())
    }
}

fn check(field: &'static str, ok: bool, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
