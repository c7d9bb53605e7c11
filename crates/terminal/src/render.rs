//! Turns display events into stdout lines.

use std::io::{self, Write};

use chess_core::Color;
use coordinator::{DisplayEvent, Phase, Turn};
use tokio::sync::mpsc;

/// Training lines are printed at most once per this many episodes.
const TRAINING_REPORT_EVERY: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

pub async fn run(
    format: Format,
    human: Color,
    mut events: mpsc::UnboundedReceiver<DisplayEvent>,
) -> anyhow::Result<()> {
    let mut text = TextRenderer::new(human);
    while let Some(event) = events.recv().await {
        write_event(format, &mut text, &event)?;
    }
    Ok(())
}

fn write_event(
    format: Format,
    text: &mut TextRenderer,
    event: &DisplayEvent,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match format {
        Format::Json => {
            serde_json::to_writer(&mut out, event)?;
            writeln!(out)?;
        }
        Format::Text => {
            for line in text.render(event) {
                writeln!(out, "{line}")?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Plain-text view. Keeps a little state to thin out the noisy events.
pub struct TextRenderer {
    human: Color,
    /// Best score seen so far at the current search depth.
    best_at_depth: Option<(u8, f32)>,
    last_training_report: Option<u64>,
}

impl TextRenderer {
    pub fn new(human: Color) -> Self {
        Self {
            human,
            best_at_depth: None,
            last_training_report: None,
        }
    }

    pub fn render(&mut self, event: &DisplayEvent) -> Vec<String> {
        match event {
            DisplayEvent::Phase { phase } => self.phase(*phase),
            DisplayEvent::Board { rows, .. } => {
                let mut lines = vec![String::new()];
                lines.extend(rows.iter().cloned());
                lines.push("  a b c d e f g h".to_string());
                lines
            }
            DisplayEvent::HistoryEntry {
                ply, side, san, by_engine, ..
            } => {
                let who = if *by_engine { "engine" } else { "you" };
                vec![format!("{ply:>3}. {:<5} {san:<8} ({who})", side.to_string())]
            }
            DisplayEvent::Thought { depth, mv, score } => {
                let improved = match self.best_at_depth {
                    Some((d, best)) if d == *depth => *score > best,
                    _ => true,
                };
                if improved {
                    self.best_at_depth = Some((*depth, *score));
                    vec![format!("  thinking d{depth}: {mv} {score:+.3}")]
                } else {
                    Vec::new()
                }
            }
            DisplayEvent::Confidence {
                mv,
                confidence,
                depth,
                nodes,
                line,
                ..
            } => {
                self.best_at_depth = None;
                let mut lines = vec![format!(
                    "Engine plays {mv}: confidence {:.0}%, depth {depth}, {nodes} nodes",
                    confidence * 100.0
                )];
                if line.len() > 1 {
                    lines.push(format!("  expects: {}", line.join(" ")));
                }
                lines
            }
            DisplayEvent::Training {
                episodes,
                last_outcome,
                last_plies,
            } => {
                let due = self.last_training_report.is_none_or(|last| {
                    *episodes < last || *episodes >= last + TRAINING_REPORT_EVERY
                });
                if due {
                    self.last_training_report = Some(*episodes);
                    vec![format!(
                        "  [self-play] {episodes} games, last: {last_outcome} \
                         after {last_plies} plies"
                    )]
                } else {
                    Vec::new()
                }
            }
            DisplayEvent::Notice { message } => vec![message.clone()],
            DisplayEvent::GameOver { message, movetext, .. } => {
                vec![format!("Game over: {message}."), movetext.clone()]
            }
        }
    }

    fn phase(&mut self, phase: Phase) -> Vec<String> {
        let line = match phase {
            Phase::MainMenu => "Main menu. Commands: play, about, quit.".to_string(),
            Phase::InGame(Turn::AwaitingHumanMove) => {
                format!("Your move as {} (e.g. e2 e4), or `menu`:", self.human)
            }
            Phase::InGame(Turn::EngineThinking) => {
                self.best_at_depth = None;
                "Engine is thinking...".to_string()
            }
            Phase::GameOver => "Type `play` for a new game or `menu`.".to_string(),
        };
        vec![line]
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
