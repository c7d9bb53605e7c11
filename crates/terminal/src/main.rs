//! `rlchess`: line-oriented terminal front end.
//!
//! Commands and moves are read from stdin; display events are written to
//! stdout, as text or as JSON lines. Logs go to stderr (`RUST_LOG`).

mod input;
mod render;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use chess_core::Color;
use clap::{Parser, ValueEnum};
use coordinator::{AppConfig, Control, Coordinator};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::render::Format;

#[derive(Parser, Debug)]
#[command(
    name = "rlchess",
    version,
    about = "Play chess against an engine that learns by self-play while you think"
)]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print events as JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Side you play (overrides the config file)
    #[arg(long, value_enum)]
    human: Option<Side>,

    /// Seed for reproducible self-play (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(side) = args.human {
        config.human_color = side.into();
    }
    if let Some(seed) = args.seed {
        config.training.seed = Some(seed);
    }
    info!(human = %config.human_color, depth = config.search.max_depth, "starting");

    let format = if args.json { Format::Json } else { Format::Text };
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (controls_tx, controls_rx) = mpsc::channel(16);

    let coordinator = Coordinator::new(config.clone(), events_tx).context("invalid configuration")?;
    let renderer = tokio::spawn(render::run(format, config.human_color, events_rx));
    spawn_stdin_reader(controls_tx).context("starting stdin reader")?;

    coordinator.run(controls_rx).await;
    // The event sender went away with the coordinator, so the renderer
    // finishes once it has printed the backlog.
    renderer.await.context("renderer task failed")??;
    Ok(())
}

/// Reads stdin on its own thread; a blocking read would otherwise keep the
/// runtime from shutting down. End of input counts as `quit`.
fn spawn_stdin_reader(controls: mpsc::Sender<Control>) -> io::Result<()> {
    thread::Builder::new().name("stdin".to_string()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let Some(control) = input::parse_command(&line) else {
                continue;
            };
            debug!(?control, "command");
            let quit = control == Control::Quit;
            if controls.blocking_send(control).is_err() || quit {
                return;
            }
        }
        let _ = controls.blocking_send(Control::Quit);
    })?;
    Ok(())
}
