//! Background self-play.
//!
//! The trainer plays the engine against itself from the live game position,
//! then walks each finished episode backwards computing TD(λ) targets and
//! nudges the shared evaluator toward them. It runs on its own OS thread until
//! the game ends; the only shared state it touches is the [`SharedEvaluator`].

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use chess_core::{Color, GameStatus, Move, Position, game_status, legal_moves};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::config::TrainingConfig;
use crate::evaluator::{Evaluate, SharedEvaluator};

/// Read-only view of the real game that self-play starts from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LivePosition {
    pub position: Position,
    /// Repetition keys of the positions before `position`.
    pub history: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "winner", rename_all = "snake_case")]
pub enum EpisodeOutcome {
    Win(Color),
    Draw,
    /// Hit the ply cap; scored like a draw.
    Truncated,
}

impl std::fmt::Display for EpisodeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpisodeOutcome::Win(c) => write!(f, "{c} won"),
            EpisodeOutcome::Draw => write!(f, "draw"),
            EpisodeOutcome::Truncated => write!(f, "truncated"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub plies: usize,
    pub outcome: EpisodeOutcome,
    /// Updates applied to the evaluator for this episode.
    pub updates: usize,
}

/// Sent after every episode. Dropped rather than queued when the consumer
/// falls behind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingProgress {
    pub episodes: u64,
    pub last_outcome: EpisodeOutcome,
    pub last_plies: usize,
}

struct Step {
    position: Position,
    mv: Move,
    /// Evaluator value of `position` when it was played.
    prediction: f32,
}

pub struct Trainer {
    evaluator: SharedEvaluator,
    config: TrainingConfig,
    rng: StdRng,
    cancel: Arc<AtomicBool>,
    episodes: u64,
}

impl Trainer {
    pub fn new(
        evaluator: SharedEvaluator,
        config: TrainingConfig,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            evaluator,
            config,
            rng,
            cancel,
            episodes: 0,
        }
    }

    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Plays one self-play game from `start` and trains on it.
    ///
    /// `history` holds the repetition keys of the real game before `start`.
    /// A finished game restarts from the standard position. Returns `None`
    /// when cancelled before the episode finished; nothing is updated then.
    pub fn run_episode(&mut self, start: &Position, history: &[u64]) -> Option<EpisodeSummary> {
        let (mut pos, mut keys) = if game_status(start, history).is_over() {
            (Position::startpos(), Vec::new())
        } else {
            (start.clone(), history.to_vec())
        };

        let mut steps: Vec<Step> = Vec::with_capacity(self.config.ply_cap);
        let final_status = loop {
            if self.cancelled() {
                return None;
            }
            let status = game_status(&pos, &keys);
            if status.is_over() {
                break Some(status);
            }
            if steps.len() >= self.config.ply_cap {
                break None;
            }

            let prediction = self.evaluator.value(&pos);
            let mv = self.pick_move(&pos, &keys);
            keys.push(pos.position_hash());
            let next = pos.play(mv);
            steps.push(Step {
                position: pos,
                mv,
                prediction,
            });
            pos = next;
        };

        let (outcome, terminal_value) = match final_status {
            Some(GameStatus::Checkmate(loser)) => (EpisodeOutcome::Win(loser.other()), -1.0),
            Some(_) => (EpisodeOutcome::Draw, 0.0),
            None => (EpisodeOutcome::Truncated, 0.0),
        };

        let targets =
            td_lambda_targets(&steps, terminal_value, self.config.gamma, self.config.lambda);
        let lr = self.config.learning_rate;
        for (step, target) in steps.iter().zip(&targets) {
            self.evaluator.update(&step.position, *target, lr);
        }
        let mut updates = steps.len();
        if final_status.is_some() {
            self.evaluator.update(&pos, terminal_value, lr);
            updates += 1;
        }

        self.episodes += 1;
        debug!(
            episode = self.episodes,
            plies = steps.len(),
            %outcome,
            first = ?steps.first().map(|s| s.mv.to_string()),
            "self-play episode finished"
        );
        Some(EpisodeSummary {
            plies: steps.len(),
            outcome,
            updates,
        })
    }

    /// Runs up to `n` episodes from `start`, stopping early on cancellation.
    pub fn run_episodes(&mut self, n: usize, start: &Position) -> Vec<EpisodeSummary> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match self.run_episode(start, &[]) {
                Some(summary) => out.push(summary),
                None => break,
            }
        }
        out
    }

    /// Exploration move with probability ε, otherwise a softmax draw among
    /// the `top_k` best-scored moves.
    fn pick_move(&mut self, pos: &Position, keys: &[u64]) -> Move {
        let moves = legal_moves(pos);
        if moves.len() == 1 || self.rng.gen_bool(self.config.epsilon.clamp(0.0, 1.0)) {
            if let Some(&mv) = moves.choose(&mut self.rng) {
                return mv;
            }
        }

        let mut line = keys.to_vec();
        line.push(pos.position_hash());
        let mut scored: Vec<(Move, f32)> = moves
            .iter()
            .map(|&mv| (mv, self.score_move(pos, mv, &line)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.config.top_k.max(1));

        let best = scored[0].1;
        let temperature = self.config.temperature.max(1e-3);
        let weights: Vec<f32> = scored
            .iter()
            .map(|(_, s)| ((s - best) / temperature).exp())
            .collect();
        match WeightedIndex::new(&weights) {
            Ok(dist) => scored[dist.sample(&mut self.rng)].0,
            Err(_) => scored[0].0,
        }
    }

    /// Value of playing `mv` for the mover: exact for game-ending moves,
    /// otherwise the negated evaluator value of the successor.
    fn score_move(&self, pos: &Position, mv: Move, line: &[u64]) -> f32 {
        let next = pos.play(mv);
        match game_status(&next, line) {
            GameStatus::Checkmate(_) => 1.0,
            GameStatus::Ongoing => -self.evaluator.value(&next),
            _ => 0.0,
        }
    }
}

/// Backward TD(λ) returns, each from the perspective of the side to move at
/// that step:
///
/// `G_T = terminal`, `G_t = -γ((1 - λ) V(s_{t+1}) + λ G_{t+1})`
///
/// with `V(s_T)` taken as the terminal value.
fn td_lambda_targets(steps: &[Step], terminal: f32, gamma: f32, lambda: f32) -> Vec<f32> {
    let mut targets = vec![0.0; steps.len()];
    let mut next_return = terminal;
    let mut next_value = terminal;
    for t in (0..steps.len()).rev() {
        let g = -gamma * ((1.0 - lambda) * next_value + lambda * next_return);
        targets[t] = g;
        next_return = g;
        next_value = steps[t].prediction;
    }
    targets
}

/// Owns the self-play thread. Stopping (explicitly or on drop) raises the
/// cancel flag and joins the thread; the flag is checked every ply.
pub struct TrainerHandle {
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl TrainerHandle {
    pub fn spawn(
        evaluator: SharedEvaluator,
        config: TrainingConfig,
        live: watch::Receiver<LivePosition>,
        progress: mpsc::Sender<TrainingProgress>,
    ) -> io::Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut trainer = Trainer::new(evaluator, config, cancel.clone());

        let thread = thread::Builder::new()
            .name("self-play".to_string())
            .spawn(move || {
                while !trainer.cancelled() {
                    let snapshot = live.borrow().clone();
                    let Some(summary) =
                        trainer.run_episode(&snapshot.position, &snapshot.history)
                    else {
                        break;
                    };
                    let report = TrainingProgress {
                        episodes: trainer.episodes(),
                        last_outcome: summary.outcome,
                        last_plies: summary.plies,
                    };
                    if let Err(mpsc::error::TrySendError::Closed(_)) = progress.try_send(report) {
                        break;
                    }
                }
                trainer.episodes()
            })?;

        info!("self-play trainer started");
        Ok(Self {
            cancel,
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stops the thread and returns the number of completed episodes.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.cancel.store(true, Ordering::Relaxed);
        let Some(thread) = self.thread.take() else {
            return 0;
        };
        match thread.join() {
            Ok(episodes) => {
                info!(episodes, "self-play trainer stopped");
                episodes
            }
            Err(_) => {
                error!("self-play thread panicked");
                0
            }
        }
    }
}

impl Drop for TrainerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "trainer_tests.rs"]
mod trainer_tests;
