//! The game state machine.
//!
//! ```text
//! MainMenu -> InGame(AwaitingHumanMove <-> EngineThinking) -> GameOver
//! ```
//!
//! `ReturnToMenu` is accepted in every phase. Each game gets a fresh
//! evaluator and its own self-play thread, both dropped when the game is
//! left; nothing carries over between games.

use chess_core::{Color, GameStatus, NoLegalMovesError, Position, TimeControl};
use selfplay_engine::{
    LivePosition, SearchOutcome, SharedEvaluator, TrainerHandle, TrainingProgress, choose_move,
};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, ConfigError};
use crate::error::CoordinatorError;
use crate::events::DisplayEvent;
use crate::game::GameState;

pub const ABOUT_TEXT: &str = "rlchess: the engine starts every game knowing only piece values \
and learns by playing against itself in the background while you think. \
Enter moves as two squares, e.g. `e2 e4` or `e7 e8 q`.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    AwaitingHumanMove,
    EngineThinking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    MainMenu,
    InGame(Turn),
    GameOver,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::MainMenu => write!(f, "in the main menu"),
            Phase::InGame(Turn::AwaitingHumanMove) => write!(f, "waiting for your move"),
            Phase::InGame(Turn::EngineThinking) => write!(f, "the engine is thinking"),
            Phase::GameOver => write!(f, "the game is over"),
        }
    }
}

/// Input from the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    NewGame,
    /// Raw move text, parsed by the coordinator.
    Move(String),
    ReturnToMenu,
    About,
    Quit,
}

struct EngineReply {
    game: u64,
    result: Result<SearchOutcome, NoLegalMovesError>,
}

/// Resources that live exactly as long as one game.
struct ActiveGame {
    id: u64,
    state: GameState,
    evaluator: SharedEvaluator,
    trainer: Option<TrainerHandle>,
    live: watch::Sender<LivePosition>,
    /// Stop handle of the search in flight, if any.
    search: Option<TimeControl>,
}

impl ActiveGame {
    fn stop_search(&mut self) {
        if let Some(tc) = self.search.take() {
            tc.stop();
        }
    }

    fn stop_training(&mut self) {
        if let Some(trainer) = self.trainer.take() {
            let episodes = trainer.stop();
            info!(game = self.id, episodes, updates = self.evaluator.updates(), "training stopped");
        }
    }
}

pub struct Coordinator {
    config: AppConfig,
    start: Position,
    phase: Phase,
    game: Option<ActiveGame>,
    games_started: u64,
    events: mpsc::UnboundedSender<DisplayEvent>,
    replies_tx: mpsc::UnboundedSender<EngineReply>,
    replies_rx: mpsc::UnboundedReceiver<EngineReply>,
    progress_tx: mpsc::Sender<TrainingProgress>,
    progress_rx: mpsc::Receiver<TrainingProgress>,
}

impl Coordinator {
    pub fn new(
        config: AppConfig,
        events: mpsc::UnboundedSender<DisplayEvent>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let start = config.start_position()?;
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        let (progress_tx, progress_rx) = mpsc::channel(config.training.progress_capacity);
        Ok(Self {
            config,
            start,
            phase: Phase::MainMenu,
            game: None,
            games_started: 0,
            events,
            replies_tx,
            replies_rx,
            progress_tx,
            progress_rx,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref().map(|g| &g.state)
    }

    pub fn is_training(&self) -> bool {
        self.game
            .as_ref()
            .and_then(|g| g.trainer.as_ref())
            .is_some_and(TrainerHandle::is_running)
    }

    pub fn human_color(&self) -> Color {
        self.config.human_color
    }

    fn emit(&self, event: DisplayEvent) {
        // The renderer going away only matters to the run loop.
        let _ = self.events.send(event);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "phase change");
        }
        self.phase = phase;
        self.emit(DisplayEvent::Phase { phase });
    }

    /// Starts a fresh game, abandoning any game in progress.
    pub fn start_game(&mut self) -> Result<(), CoordinatorError> {
        self.end_game();

        let state = GameState::new(self.start.clone());
        let evaluator = SharedEvaluator::baseline();
        let (live, live_rx) = watch::channel(state.live());
        // Reports of an earlier game's trainer.
        while self.progress_rx.try_recv().is_ok() {}
        let trainer = TrainerHandle::spawn(
            evaluator.clone(),
            self.config.training.clone(),
            live_rx,
            self.progress_tx.clone(),
        )?;

        self.games_started += 1;
        let id = self.games_started;
        info!(
            game = id,
            human = %self.config.human_color,
            fen = %state.position().to_fen(),
            "game started"
        );
        self.emit(DisplayEvent::board(state.position()));
        self.game = Some(ActiveGame {
            id,
            state,
            evaluator,
            trainer: Some(trainer),
            live,
            search: None,
        });
        self.after_move();
        Ok(())
    }

    /// Plays the human's move. On error nothing changes.
    pub fn submit_move(&mut self, text: &str) -> Result<(), CoordinatorError> {
        if self.phase != Phase::InGame(Turn::AwaitingHumanMove) {
            return Err(CoordinatorError::NotAwaitingMove(self.phase));
        }
        let Some(game) = self.game.as_mut() else {
            return Err(CoordinatorError::NotAwaitingMove(self.phase));
        };

        let record = game.state.apply_input(text)?;
        game.live.send_replace(game.state.live());
        debug!(game = game.id, ply = record.ply, san = %record.san, "human move");
        let board = DisplayEvent::board(game.state.position());
        self.emit(DisplayEvent::history(&record));
        self.emit(board);
        self.after_move();
        Ok(())
    }

    /// Plays the move the search settled on.
    pub fn finish_engine_turn(&mut self, outcome: SearchOutcome) -> Result<(), CoordinatorError> {
        if self.phase != Phase::InGame(Turn::EngineThinking) {
            return Err(CoordinatorError::NotAwaitingMove(self.phase));
        }
        let Some(game) = self.game.as_mut() else {
            return Err(CoordinatorError::NotAwaitingMove(self.phase));
        };

        game.search = None;
        let record = game
            .state
            .apply_move(outcome.best_move, true)
            .map_err(chess_core::MoveInputError::from)?;
        game.live.send_replace(game.state.live());
        info!(
            game = game.id,
            ply = record.ply,
            san = %record.san,
            confidence = outcome.confidence,
            depth = outcome.depth,
            nodes = outcome.nodes,
            stopped = outcome.stopped,
            "engine move"
        );
        let board = DisplayEvent::board(game.state.position());
        self.emit(DisplayEvent::confidence(&outcome));
        self.emit(DisplayEvent::history(&record));
        self.emit(board);
        self.after_move();
        Ok(())
    }

    /// Leaves the current game, if any.
    pub fn return_to_menu(&mut self) {
        self.end_game();
        self.set_phase(Phase::MainMenu);
    }

    pub fn shutdown(&mut self) {
        self.end_game();
        info!("coordinator shut down");
    }

    pub fn about(&self) {
        self.emit(DisplayEvent::notice(ABOUT_TEXT));
    }

    /// Handles one control signal; `false` once the program should exit.
    pub fn handle_control(&mut self, control: Control) -> bool {
        match control {
            Control::NewGame => {
                if let Err(e) = self.start_game() {
                    error!(error = %e, "could not start a game");
                    self.emit(DisplayEvent::notice(e.to_string()));
                    self.set_phase(Phase::MainMenu);
                }
            }
            Control::Move(text) => {
                if let Err(e) = self.submit_move(&text) {
                    warn!(input = %text, error = %e, "move rejected");
                    self.emit(DisplayEvent::notice(e.to_string()));
                }
            }
            Control::ReturnToMenu => self.return_to_menu(),
            Control::About => self.about(),
            Control::Quit => return false,
        }
        true
    }

    /// Drives the game until `Quit` arrives or the control channel closes.
    pub async fn run(mut self, mut controls: mpsc::Receiver<Control>) {
        self.emit(DisplayEvent::Phase { phase: self.phase });
        loop {
            tokio::select! {
                control = controls.recv() => {
                    let Some(control) = control else { break };
                    if !self.handle_control(control) {
                        break;
                    }
                }
                Some(reply) = self.replies_rx.recv() => self.on_engine_reply(reply),
                Some(progress) = self.progress_rx.recv() => self.on_progress(progress),
            }
        }
        self.shutdown();
    }

    fn on_engine_reply(&mut self, reply: EngineReply) {
        let current = self.game.as_ref().map(|g| g.id);
        if current != Some(reply.game) || self.phase != Phase::InGame(Turn::EngineThinking) {
            debug!(game = reply.game, "discarding stale search result");
            return;
        }
        match reply.result {
            Ok(outcome) => {
                if let Err(e) = self.finish_engine_turn(outcome) {
                    error!(error = %e, "engine move could not be played");
                    self.game_over_from_state();
                }
            }
            Err(e) => {
                error!(error = %e, "engine was asked to move in a finished position");
                self.game_over_from_state();
            }
        }
    }

    fn on_progress(&mut self, progress: TrainingProgress) {
        if matches!(self.phase, Phase::InGame(_)) {
            self.emit(DisplayEvent::training(&progress));
        }
    }

    /// Moves on after a position change: ends the game, hands the move to
    /// the engine or waits for the human.
    fn after_move(&mut self) {
        let Some(game) = self.game.as_ref() else {
            return;
        };
        let status = game.state.status();
        if status.is_over() {
            self.enter_game_over(status);
        } else if game.state.side_to_move() == self.config.engine_color() {
            self.begin_engine_turn();
        } else {
            self.set_phase(Phase::InGame(Turn::AwaitingHumanMove));
        }
    }

    fn begin_engine_turn(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let limits = self.config.search.limits();
        // The turn's clock runs from here; a stop issued before the blocking
        // task is scheduled still reaches the search.
        limits.start();
        let tc = limits.time_control.clone();
        game.search = Some(tc.clone());

        let evaluator = game.evaluator.clone();
        let position = game.state.position().clone();
        let history = game.state.history().to_vec();
        let events = self.events.clone();
        let replies = self.replies_tx.clone();
        let id = game.id;
        debug!(game = id, depth = limits.depth, "engine thinking");

        tokio::task::spawn_blocking(move || {
            let result = choose_move(&evaluator, &position, &history, &limits, |thought| {
                if !tc.is_stopped() {
                    let _ = events.send(DisplayEvent::thought(thought));
                }
            });
            let _ = replies.send(EngineReply { game: id, result });
        });
        self.set_phase(Phase::InGame(Turn::EngineThinking));
    }

    fn enter_game_over(&mut self, status: GameStatus) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        game.stop_search();
        game.stop_training();
        info!(game = game.id, plies = game.state.ply_count(), %status, "game over");
        let event = DisplayEvent::game_over(status, game.state.movetext());
        self.emit(event);
        self.set_phase(Phase::GameOver);
    }

    fn game_over_from_state(&mut self) {
        if let Some(status) = self.game.as_ref().map(|g| g.state.status()) {
            self.enter_game_over(status);
        }
    }

    /// Cancels the search, joins the trainer and drops the game.
    fn end_game(&mut self) {
        if let Some(mut game) = self.game.take() {
            game.stop_search();
            game.stop_training();
            debug!(game = game.id, "game closed");
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod coordinator_tests;
