//! Iterative-deepening negamax with alpha-beta pruning over evaluator values.

use chess_core::{
    Move, NoLegalMovesError, Position, SearchLimits, TimeControl, is_threefold, legal_moves,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluator::Evaluate;

/// Score of being mated at the root; shorter mates score further from zero.
pub const MATE_SCORE: f32 = 10.0;
const MATE_PLY_STEP: f32 = 0.01;
/// Sharpness `k` of `1 - exp(-k * gap)`.
const CONFIDENCE_SHARPNESS: f32 = 3.0;

/// One scored root move, emitted as the search produces it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    pub depth: u8,
    pub mv: Move,
    /// Value for the engine, mate scores included.
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub best_move: Move,
    pub score: f32,
    /// In `[0, 1]`, from the gap between the best and second-best root move.
    pub confidence: f32,
    /// Deepest fully searched iteration (0 if none finished).
    pub depth: u8,
    pub nodes: u64,
    /// True if the time budget or an outside stop cut the search short.
    pub stopped: bool,
    /// Expected line of play, starting with `best_move`.
    pub pv: Vec<Move>,
    pub trace: Vec<Thought>,
}

/// Picks a move for the side to move in `pos`.
///
/// `history` holds the repetition keys of the game before `pos`, so lines
/// that repeat the real game count as draws. Leaf values come from a fresh
/// `evaluator.freeze()` each iteration. `on_thought` sees every root move
/// score as soon as it is known.
pub fn choose_move<E: Evaluate>(
    evaluator: &E,
    pos: &Position,
    history: &[u64],
    limits: &SearchLimits,
    mut on_thought: impl FnMut(&Thought),
) -> Result<SearchOutcome, NoLegalMovesError> {
    let mut roots = legal_moves(pos);
    if roots.is_empty() {
        return Err(NoLegalMovesError);
    }
    order_moves(pos, &mut roots);
    limits.start();
    let tc = &limits.time_control;

    let mut line = history.to_vec();
    line.push(pos.position_hash());
    let mut nodes = 0u64;
    let mut trace = Vec::new();

    if roots.len() == 1 {
        let mv = roots[0];
        let frozen = evaluator.freeze();
        let next = pos.play(mv);
        line.push(next.position_hash());
        let mut pv = vec![mv];
        let mut reply = Vec::new();
        let result = negamax(
            &frozen,
            &next,
            0,
            f32::NEG_INFINITY,
            f32::INFINITY,
            1,
            &mut line,
            &mut nodes,
            tc,
            &mut reply,
        );
        let score = result.map_or(0.0, |s| -s);
        pv.append(&mut reply);
        let thought = Thought { depth: 1, mv, score };
        on_thought(&thought);
        trace.push(thought);
        return Ok(SearchOutcome {
            best_move: mv,
            score,
            confidence: 1.0,
            depth: 1,
            nodes,
            stopped: result.is_none(),
            pv,
            trace,
        });
    }

    let mut completed: Option<(u8, Vec<(Move, f32)>, Vec<Move>)> = None;
    let mut partial_best: Option<(Move, f32, Vec<Move>)> = None;
    let mut stopped = false;
    let mut child_pv = Vec::new();

    for depth in 1..=limits.depth.max(1) {
        let frozen = evaluator.freeze();
        let mut scored: Vec<(Move, f32)> = Vec::with_capacity(roots.len());
        let mut lines: Vec<Vec<Move>> = Vec::with_capacity(roots.len());

        for &mv in &roots {
            if tc.check_time() {
                stopped = true;
                break;
            }
            let next = pos.play(mv);
            line.push(next.position_hash());
            let result = negamax(
                &frozen,
                &next,
                depth - 1,
                f32::NEG_INFINITY,
                f32::INFINITY,
                1,
                &mut line,
                &mut nodes,
                tc,
                &mut child_pv,
            );
            line.pop();
            let Some(child) = result else {
                stopped = true;
                break;
            };
            let score = -child;

            let thought = Thought { depth, mv, score };
            on_thought(&thought);
            trace.push(thought);

            lines.push(prepend(mv, &child_pv));
            scored.push((mv, score));
            if partial_best.as_ref().is_none_or(|(_, best, _)| score > *best) {
                partial_best = Some((mv, score, prepend(mv, &child_pv)));
            }
        }

        if stopped {
            debug!(depth, nodes, "search iteration abandoned");
            break;
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        roots = scored.iter().map(|(mv, _)| *mv).collect();
        let best_score = scored[0].1;
        let best_pv = lines
            .into_iter()
            .find(|pv| pv.first() == Some(&scored[0].0))
            .unwrap_or_else(|| vec![scored[0].0]);
        debug!(
            depth,
            nodes,
            best = %scored[0].0,
            score = best_score,
            pv_len = best_pv.len(),
            "search iteration done"
        );
        completed = Some((depth, scored, best_pv));
        partial_best = None;

        if best_score.abs() >= MATE_SCORE - MATE_PLY_STEP * f32::from(depth) {
            break;
        }
    }

    let outcome = match completed {
        Some((depth, scored, pv)) => SearchOutcome {
            best_move: scored[0].0,
            score: scored[0].1,
            confidence: confidence(&scored),
            depth,
            nodes,
            stopped,
            pv,
            trace,
        },
        None => {
            let (best_move, score, pv) = partial_best.unwrap_or((roots[0], 0.0, vec![roots[0]]));
            SearchOutcome {
                best_move,
                score,
                confidence: 0.0,
                depth: 0,
                nodes,
                stopped,
                pv,
                trace,
            }
        }
    };
    Ok(outcome)
}

fn prepend(mv: Move, rest: &[Move]) -> Vec<Move> {
    let mut pv = Vec::with_capacity(rest.len() + 1);
    pv.push(mv);
    pv.extend_from_slice(rest);
    pv
}

/// `1 - exp(-k * (best - second))`; `scored` must be sorted best first.
fn confidence(scored: &[(Move, f32)]) -> f32 {
    match scored {
        [] => 0.0,
        [_] => 1.0,
        [(_, best), (_, second), ..] => {
            let gap = (best - second).max(0.0);
            1.0 - (-CONFIDENCE_SHARPNESS * gap).exp()
        }
    }
}

/// Captures and promotions first, otherwise generation order.
fn order_moves(pos: &Position, moves: &mut [Move]) {
    moves.sort_by_key(|&mv| {
        let flags = pos.classify(mv);
        !(flags.capture || flags.promotion)
    });
}

/// Negamax value of `pos` for its side to move, or `None` once the search
/// has been told to stop. `line` ends with the key of `pos`; `pv` receives
/// the best line found from `pos`.
#[allow(clippy::too_many_arguments)]
fn negamax<E: Evaluate>(
    eval: &E,
    pos: &Position,
    depth: u8,
    mut alpha: f32,
    beta: f32,
    ply: u8,
    line: &mut Vec<u64>,
    nodes: &mut u64,
    tc: &TimeControl,
    pv: &mut Vec<Move>,
) -> Option<f32> {
    pv.clear();
    *nodes += 1;
    if tc.should_check_time(*nodes) && tc.check_time() {
        return None;
    }

    let mut moves = legal_moves(pos);
    if moves.is_empty() {
        return Some(if pos.in_check(pos.side_to_move) {
            -MATE_SCORE + MATE_PLY_STEP * f32::from(ply)
        } else {
            0.0
        });
    }

    if let Some((key, earlier)) = line.split_last()
        && is_threefold(*key, earlier)
    {
        return Some(0.0);
    }
    if pos.is_fifty_move_draw() || pos.is_insufficient_material() {
        return Some(0.0);
    }

    if depth == 0 {
        return Some(eval.value(pos));
    }

    order_moves(pos, &mut moves);
    let mut best = f32::NEG_INFINITY;
    let mut child_pv = Vec::new();
    for mv in moves {
        let next = pos.play(mv);
        line.push(next.position_hash());
        let result = negamax(
            eval,
            &next,
            depth - 1,
            -beta,
            -alpha,
            ply + 1,
            line,
            nodes,
            tc,
            &mut child_pv,
        );
        line.pop();
        let score = -result?;

        if score > best {
            best = score;
            pv.clear();
            pv.push(mv);
            pv.extend_from_slice(&child_pv);
        }
        if best > alpha {
            alpha = best;
        }
        if alpha >= beta {
            break; // Beta cutoff
        }
    }
    Some(best)
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
