//! Text forms of moves: the human input format, compact coordinates and SAN.

use crate::board::Position;
use crate::error::{IllegalMoveError, InvalidMoveInputError, MoveInputError};
use crate::movegen::{has_legal_move, legal_moves};
use crate::types::*;

/// A syntactically valid move request, not yet checked against a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveText {
    pub from: u8,
    pub to: u8,
    pub promo: Option<PieceKind>,
}

/// Parses `e2 e4`, `e7 e8 q`, `E2 E4`, `e2e4` or `e7e8q`.
pub fn parse_move_text(text: &str) -> Result<MoveText, InvalidMoveInputError> {
    let lowered = text.trim().to_ascii_lowercase();
    let mut tokens: Vec<String> = lowered.split_whitespace().map(str::to_string).collect();

    // Compact form: a single token holding both squares.
    if tokens.len() == 1 && (4..=5).contains(&tokens[0].len()) && tokens[0].is_ascii() {
        let t = tokens.remove(0);
        tokens.push(t[0..2].to_string());
        tokens.push(t[2..4].to_string());
        if t.len() == 5 {
            tokens.push(t[4..5].to_string());
        }
    }

    if !(2..=3).contains(&tokens.len()) {
        return Err(InvalidMoveInputError::WrongTokenCount(tokens.len()));
    }

    let square =
        |t: &str| coord_to_sq(t).ok_or_else(|| InvalidMoveInputError::BadSquare(t.to_string()));
    let from = square(&tokens[0])?;
    let to = square(&tokens[1])?;
    let promo = match tokens.get(2) {
        None => None,
        Some(t) => {
            let mut chars = t.chars();
            match (chars.next().and_then(PieceKind::from_letter), chars.next()) {
                (Some(kind), None) if is_promotion_piece(kind) => Some(kind),
                _ => return Err(InvalidMoveInputError::BadPromotion(t.clone())),
            }
        }
    };

    Ok(MoveText { from, to, promo })
}

fn is_promotion_piece(kind: PieceKind) -> bool {
    matches!(
        kind,
        PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight
    )
}

/// Finds the legal move matching the request. A pawn reaching the last rank
/// without a promotion letter becomes a queen.
pub fn resolve_move(pos: &Position, text: MoveText) -> Result<Move, IllegalMoveError> {
    let legals = legal_moves(pos);
    let is_promotion = legals
        .iter()
        .any(|m| m.from == text.from && m.to == text.to && m.promo.is_some());
    let wanted = Move {
        from: text.from,
        to: text.to,
        promo: match (text.promo, is_promotion) {
            (None, true) => Some(PieceKind::Queen),
            (promo, _) => promo,
        },
    };
    if legals.contains(&wanted) {
        Ok(wanted)
    } else {
        Err(IllegalMoveError { mv: wanted })
    }
}

/// Parses human input and resolves it against `pos` in one step.
pub fn parse_move_input(pos: &Position, text: &str) -> Result<Move, MoveInputError> {
    let parsed = parse_move_text(text)?;
    Ok(resolve_move(pos, parsed)?)
}

/// Compact coordinate form, e.g. `e2e4` or `e7e8q`.
pub fn move_to_coord(mv: Move) -> String {
    mv.to_string()
}

/// Standard Algebraic Notation for a legal move in `pos`.
pub fn san(pos: &Position, mv: Move) -> String {
    let Some(piece) = pos.piece_at(mv.from) else {
        return move_to_coord(mv);
    };
    let flags = pos.classify(mv);

    let mut out = String::new();
    if flags.castle {
        out.push_str(if mv.to > mv.from { "O-O" } else { "O-O-O" });
    } else {
        if piece.kind != PieceKind::Pawn {
            out.push(piece.kind.letter().to_ascii_uppercase());
            out.push_str(&disambiguation(pos, mv, piece.kind));
        }
        if flags.capture {
            if piece.kind == PieceKind::Pawn {
                out.push((b'a' + (mv.from % 8)) as char);
            }
            out.push('x');
        }
        out.push_str(&sq_to_coord(mv.to));
        if let Some(promo) = mv.promo {
            out.push('=');
            out.push(promo.letter().to_ascii_uppercase());
        }
    }

    let next = pos.play(mv);
    if next.in_check(next.side_to_move) {
        out.push(if has_legal_move(&next) { '+' } else { '#' });
    }
    out
}

/// File, rank or both of the origin when another piece of the same kind can
/// reach the same square.
fn disambiguation(pos: &Position, mv: Move, kind: PieceKind) -> String {
    let rivals: Vec<u8> = legal_moves(pos)
        .into_iter()
        .filter(|m| m.to == mv.to && m.from != mv.from)
        .filter(|m| pos.piece_at(m.from).map(|p| p.kind) == Some(kind))
        .map(|m| m.from)
        .collect();
    if rivals.is_empty() {
        return String::new();
    }
    let coord = sq_to_coord(mv.from);
    if rivals.iter().all(|&s| file_of(s) != file_of(mv.from)) {
        coord[0..1].to_string()
    } else if rivals.iter().all(|&s| rank_of(s) != rank_of(mv.from)) {
        coord[1..2].to_string()
    } else {
        coord
    }
}

#[cfg(test)]
#[path = "notation_tests.rs"]
mod notation_tests;
