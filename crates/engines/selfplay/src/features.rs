//! Sparse linear features of a position.
//!
//! Every feature is measured from the side-to-move's perspective: the board is
//! mirrored for Black, friendly terms count positive and enemy terms negative.
//! A position and its colour-flipped mirror therefore produce the same vector.

use chess_core::{Color, PieceKind, Position, file_of, mobility, rank_of, sq};

/// Material difference for P, N, B, R, Q.
pub const MATERIAL: usize = 0;
/// Piece-square occupancy, 6 kinds x 64 relative squares.
pub const PSQ: usize = MATERIAL + 5;
pub const MOBILITY: usize = PSQ + 6 * 64;
pub const PAWN_SHIELD: usize = MOBILITY + 1;
pub const KING_PRESSURE: usize = PAWN_SHIELD + 1;
pub const DOUBLED_PAWNS: usize = KING_PRESSURE + 1;
pub const ISOLATED_PAWNS: usize = DOUBLED_PAWNS + 1;
pub const PASSED_PAWNS: usize = ISOLATED_PAWNS + 1;
pub const CENTER_CONTROL: usize = PASSED_PAWNS + 1;
pub const IN_CHECK: usize = CENTER_CONTROL + 1;
pub const BIAS: usize = IN_CHECK + 1;

/// Length of the dense weight vector.
pub const NUM_FEATURES: usize = BIAS + 1;

const MOBILITY_SCALE: f32 = 0.1;
const PSQ_SCALE: f32 = 0.25;
const CENTER: [(i8, i8); 4] = [(3, 3), (4, 3), (3, 4), (4, 4)];

/// Non-zero feature values as `(index, value)` pairs, indices ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    entries: Vec<(usize, f32)>,
}

impl Features {
    fn push(&mut self, idx: usize, value: f32) {
        if value != 0.0 {
            self.entries.push((idx, value));
        }
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    /// Squared Euclidean norm.
    pub fn norm_sq(&self) -> f32 {
        self.entries.iter().map(|(_, v)| v * v).sum()
    }

    pub fn get(&self, idx: usize) -> f32 {
        self.entries
            .iter()
            .find(|(i, _)| *i == idx)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    /// Dense form, mostly for inspection and tests.
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0; NUM_FEATURES];
        for &(i, v) in &self.entries {
            dense[i] += v;
        }
        dense
    }
}

/// Square index as seen by `c`: unchanged for White, ranks flipped for Black.
pub fn relative_square(s: u8, c: Color) -> u8 {
    match c {
        Color::White => s,
        Color::Black => s ^ 56,
    }
}

pub fn extract(pos: &Position) -> Features {
    let us = pos.side_to_move;
    let them = us.other();
    let mut f = Features::default();

    for (i, kind) in PieceKind::ALL[..5].iter().enumerate() {
        let diff = pos.count(us, *kind) as f32 - pos.count(them, *kind) as f32;
        f.push(MATERIAL + i, diff);
    }

    // Friendly and enemy pieces can share a relative square, so accumulate
    // before pushing.
    let mut psq = [0.0f32; 6 * 64];
    for s in 0..64u8 {
        if let Some(pc) = pos.piece_at(s) {
            let idx = pc.kind.idx() * 64 + relative_square(s, pc.color) as usize;
            psq[idx] += if pc.color == us { PSQ_SCALE } else { -PSQ_SCALE };
        }
    }
    for (i, v) in psq.iter().enumerate() {
        f.push(PSQ + i, *v);
    }

    let mob = mobility(pos, us) as f32 - mobility(pos, them) as f32;
    f.push(MOBILITY, mob * MOBILITY_SCALE);

    f.push(PAWN_SHIELD, pawn_shield(pos, us) - pawn_shield(pos, them));
    f.push(KING_PRESSURE, king_pressure(pos, us) - king_pressure(pos, them));

    let (ours, theirs) = (PawnStructure::of(pos, us), PawnStructure::of(pos, them));
    f.push(DOUBLED_PAWNS, ours.doubled - theirs.doubled);
    f.push(ISOLATED_PAWNS, ours.isolated - theirs.isolated);
    f.push(PASSED_PAWNS, ours.passed - theirs.passed);

    f.push(CENTER_CONTROL, center_control(pos, us) - center_control(pos, them));

    if pos.in_check(us) {
        f.push(IN_CHECK, 1.0);
    }
    f.push(BIAS, 1.0);
    f
}

/// Own pawns on the three squares directly in front of the king.
fn pawn_shield(pos: &Position, c: Color) -> f32 {
    let Some(k) = pos.king_sq(c) else { return 0.0 };
    let own_pawn = Some(chess_core::Piece::new(c, PieceKind::Pawn));
    (-1..=1)
        .filter_map(|df| sq(file_of(k) + df, rank_of(k) + c.forward()))
        .filter(|&s| pos.piece_at(s) == own_pawn)
        .count() as f32
}

/// King and neighbouring squares attacked by the opponent.
fn king_pressure(pos: &Position, c: Color) -> f32 {
    let Some(k) = pos.king_sq(c) else { return 0.0 };
    let mut n = 0;
    for dr in -1..=1 {
        for df in -1..=1 {
            if let Some(s) = sq(file_of(k) + df, rank_of(k) + dr)
                && pos.is_square_attacked(s, c.other())
            {
                n += 1;
            }
        }
    }
    n as f32
}

fn center_control(pos: &Position, c: Color) -> f32 {
    CENTER
        .iter()
        .filter_map(|&(f, r)| sq(f, r))
        .filter(|&s| pos.is_square_attacked(s, c))
        .count() as f32
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct PawnStructure {
    doubled: f32,
    isolated: f32,
    passed: f32,
}

impl PawnStructure {
    fn of(pos: &Position, c: Color) -> Self {
        let mut files = [0u8; 8];
        let pawns: Vec<u8> = pos.squares_of(c, PieceKind::Pawn).collect();
        for &s in &pawns {
            files[file_of(s) as usize] += 1;
        }
        let enemy: Vec<u8> = pos.squares_of(c.other(), PieceKind::Pawn).collect();

        let mut out = PawnStructure::default();
        for n in files {
            out.doubled += n.saturating_sub(1) as f32;
        }
        for &s in &pawns {
            let f = file_of(s);
            let neighbours = [f - 1, f + 1]
                .into_iter()
                .filter(|nf| (0..8).contains(nf))
                .map(|nf| files[nf as usize])
                .sum::<u8>();
            if neighbours == 0 {
                out.isolated += 1.0;
            }
            let blocked = enemy.iter().any(|&e| {
                (file_of(e) - f).abs() <= 1 && (rank_of(e) - rank_of(s)) * c.forward() > 0
            });
            if !blocked {
                out.passed += 1.0;
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "features_tests.rs"]
mod features_tests;
