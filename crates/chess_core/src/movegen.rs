use crate::board::{DIAGONALS, KING_DELTAS, KNIGHT_DELTAS, ORTHOGONALS, Position};
use crate::types::*;

/// Generate all legal moves, returning a freshly allocated vector.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut out = Vec::with_capacity(64);
    legal_moves_into(pos, &mut out);
    out
}

/// Generate all legal moves into the provided buffer, reusing it across calls.
pub fn legal_moves_into(pos: &Position, out: &mut Vec<Move>) {
    out.clear();
    pseudo_moves(pos, pos.side_to_move, true, out);

    let mover = pos.side_to_move;
    // A pseudo move is legal when the successor does not leave the mover in check.
    out.retain(|&mv| !pos.play(mv).in_check(mover));
}

/// True when the side to move has at least one legal move.
pub fn has_legal_move(pos: &Position) -> bool {
    let mut out = Vec::with_capacity(64);
    pseudo_moves(pos, pos.side_to_move, true, &mut out);
    let mover = pos.side_to_move;
    out.into_iter().any(|mv| !pos.play(mv).in_check(mover))
}

/// Pseudo-legal move count for `c`, ignoring checks and castling.
/// Works for either side regardless of who is to move.
pub fn mobility(pos: &Position, c: Color) -> u32 {
    let mut out = Vec::with_capacity(64);
    pseudo_moves(pos, c, false, &mut out);
    out.len() as u32
}

fn pseudo_moves(pos: &Position, c: Color, castles: bool, out: &mut Vec<Move>) {
    for sq in 0..64u8 {
        let pc = match pos.piece_at(sq) {
            Some(p) => p,
            None => continue,
        };
        if pc.color != c {
            continue;
        }
        match pc.kind {
            PieceKind::Pawn => gen_pawn(pos, sq, c, out),
            PieceKind::Knight => gen_steps(pos, sq, c, out, &KNIGHT_DELTAS),
            PieceKind::Bishop => gen_slider(pos, sq, c, out, &DIAGONALS),
            PieceKind::Rook => gen_slider(pos, sq, c, out, &ORTHOGONALS),
            PieceKind::Queen => {
                gen_slider(pos, sq, c, out, &DIAGONALS);
                gen_slider(pos, sq, c, out, &ORTHOGONALS);
            }
            PieceKind::King => {
                gen_steps(pos, sq, c, out, &KING_DELTAS);
                if castles {
                    gen_castle(pos, sq, c, out);
                }
            }
        }
    }
}

fn push_pawn_move(from: u8, to: u8, promo_rank: i8, out: &mut Vec<Move>) {
    if rank_of(to) == promo_rank {
        for pk in PieceKind::PROMOTIONS {
            out.push(Move::with_promo(from, to, pk));
        }
    } else {
        out.push(Move::new(from, to));
    }
}

fn gen_pawn(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);

    let dir = c.forward();
    let start_rank = c.back_rank() + dir;
    let promo_rank = c.other().back_rank();

    // forward 1
    if let Some(to) = sq(f, r + dir)
        && pos.piece_at(to).is_none()
    {
        push_pawn_move(from, to, promo_rank, out);

        // forward 2 from start
        if r == start_rank
            && let Some(to2) = sq(f, r + 2 * dir)
            && pos.piece_at(to2).is_none()
        {
            out.push(Move::new(from, to2));
        }
    }

    // captures + en-passant
    for df in [-1, 1] {
        if let Some(to) = sq(f + df, r + dir) {
            match pos.piece_at(to) {
                Some(tpc) if tpc.color != c => push_pawn_move(from, to, promo_rank, out),
                None if pos.en_passant == Some(to) && pos.side_to_move == c => {
                    out.push(Move::new(from, to))
                }
                _ => {}
            }
        }
    }
}

fn gen_steps(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>, deltas: &[(i8, i8)]) {
    let f = file_of(from);
    let r = rank_of(from);
    for (df, dr) in deltas {
        if let Some(to) = sq(f + df, r + dr) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) if pc.color != c => out.push(Move::new(from, to)),
                _ => {}
            }
        }
    }
}

fn gen_slider(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>, dirs: &[(i8, i8)]) {
    let f0 = file_of(from);
    let r0 = rank_of(from);
    for (df, dr) in dirs {
        let mut f = f0 + df;
        let mut r = r0 + dr;
        while let Some(to) = sq(f, r) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) if pc.color != c => {
                    out.push(Move::new(from, to));
                    break;
                }
                _ => break,
            }
            f += df;
            r += dr;
        }
    }
}

fn gen_castle(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    let rank = c.back_rank();
    // Must be on original king square
    if sq(4, rank) != Some(from) {
        return;
    }

    // Can't castle out of check; the transit and destination squares are checked below.
    if pos.in_check(c) {
        return;
    }

    let enemy = c.other();
    let own_rook = Some(Piece::new(c, PieceKind::Rook));
    let empty = |files: &[i8]| {
        files
            .iter()
            .all(|&f| sq(f, rank).is_some_and(|s| pos.piece_at(s).is_none()))
    };
    let safe = |files: &[i8]| {
        files
            .iter()
            .all(|&f| sq(f, rank).is_some_and(|s| !pos.is_square_attacked(s, enemy)))
    };

    // King side: e->g, f and g empty and not attacked
    if pos.castling.kingside(c)
        && sq(7, rank).and_then(|s| pos.piece_at(s)) == own_rook
        && empty(&[5, 6])
        && safe(&[5, 6])
        && let Some(to) = sq(6, rank)
    {
        out.push(Move::new(from, to));
    }
    // Queen side: e->c, b, c and d empty; c and d not attacked
    if pos.castling.queenside(c)
        && sq(0, rank).and_then(|s| pos.piece_at(s)) == own_rook
        && empty(&[1, 2, 3])
        && safe(&[2, 3])
        && let Some(to) = sq(2, rank)
    {
        out.push(Move::new(from, to));
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
