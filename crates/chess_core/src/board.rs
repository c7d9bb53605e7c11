use serde::{Deserialize, Serialize};

use crate::error::{FenError, IllegalMoveError};
use crate::movegen::legal_moves;
use crate::types::*;
use crate::zobrist::ZOBRIST;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub wk: bool,
    pub wq: bool,
    pub bk: bool,
    pub bq: bool,
}

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights {
        wk: false,
        wq: false,
        bk: false,
        bq: false,
    };
    pub const ALL: CastlingRights = CastlingRights {
        wk: true,
        wq: true,
        bk: true,
        bq: true,
    };

    /// Rights in the order used by the Zobrist keys: wk, wq, bk, bq.
    pub fn as_array(&self) -> [bool; 4] {
        [self.wk, self.wq, self.bk, self.bq]
    }

    /// True when every right held here is also held by `other`.
    pub fn is_subset_of(&self, other: &CastlingRights) -> bool {
        self.as_array()
            .iter()
            .zip(other.as_array())
            .all(|(&mine, theirs)| !mine || theirs)
    }

    pub fn kingside(&self, c: Color) -> bool {
        match c {
            Color::White => self.wk,
            Color::Black => self.bk,
        }
    }

    pub fn queenside(&self, c: Color) -> bool {
        match c {
            Color::White => self.wq,
            Color::Black => self.bq,
        }
    }
}

/// Everything about a move that follows from the position it is played in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveFlags {
    pub capture: bool,
    pub en_passant: bool,
    pub castle: bool,
    pub double_push: bool,
    pub promotion: bool,
}

/// A complete board state. Positions are values: playing a move returns a new
/// position and leaves the original untouched, so they can be shared freely
/// between the game, the search and the trainer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<u8>, // square behind a pawn that just advanced 2
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    pub fn startpos() -> Self {
        let mut p = Position {
            board: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        };

        // Pawns
        for f in 0..8 {
            p.board[8 + f] = Some(Piece::new(Color::White, PieceKind::Pawn));
            p.board[48 + f] = Some(Piece::new(Color::Black, PieceKind::Pawn));
        }
        // Back ranks
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (f, &kind) in back.iter().enumerate() {
            p.board[f] = Some(Piece::new(Color::White, kind));
            p.board[56 + f] = Some(Piece::new(Color::Black, kind));
        }
        p
    }

    /// Parses Forsyth-Edwards Notation. The move counters are optional.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::MissingFields(parts.len()));
        }

        let board_part = parts[0];
        let stm_part = parts[1];
        let castle_part = parts[2];
        let ep_part = parts[3];
        let halfmove_part = parts.get(4).copied().unwrap_or("0");
        let fullmove_part = parts.get(5).copied().unwrap_or("1");

        let mut board = [None; 64];
        let ranks: Vec<&str> = board_part.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let mut file: i8 = 0;
            let rank: i8 = 7 - rank_idx as i8; // FEN lists rank 8 .. 1
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    file += d as i8;
                } else {
                    let color = if ch.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let kind = PieceKind::from_letter(ch).ok_or(FenError::BadPiece(ch))?;
                    let s = sq(file, rank).ok_or(FenError::FileCount { rank: rank_idx })?;
                    board[s as usize] = Some(Piece::new(color, kind));
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::FileCount { rank: rank_idx });
                }
            }
            if file != 8 {
                return Err(FenError::FileCount { rank: rank_idx });
            }
        }

        let side_to_move = match stm_part {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadSideToMove(other.to_string())),
        };

        let mut castling = CastlingRights::NONE;
        if castle_part != "-" {
            for c in castle_part.chars() {
                match c {
                    'K' => castling.wk = true,
                    'Q' => castling.wq = true,
                    'k' => castling.bk = true,
                    'q' => castling.bq = true,
                    _ => return Err(FenError::BadCastling(castle_part.to_string())),
                }
            }
        }

        let en_passant = if ep_part == "-" {
            None
        } else {
            Some(coord_to_sq(ep_part).ok_or_else(|| FenError::BadEnPassant(ep_part.to_string()))?)
        };

        let halfmove_clock: u32 = halfmove_part
            .parse()
            .map_err(|_| FenError::BadCounter(halfmove_part.to_string()))?;
        let fullmove_number: u32 = fullmove_part
            .parse()
            .map_err(|_| FenError::BadCounter(fullmove_part.to_string()))?;

        let pos = Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        };
        if pos.count(Color::White, PieceKind::King) != 1
            || pos.count(Color::Black, PieceKind::King) != 1
        {
            return Err(FenError::KingCount);
        }
        if let Some(ep) = pos.en_passant
            && !pos.en_passant_follows_push(ep)
        {
            return Err(FenError::ImpossibleEnPassant(ep_part.to_string()));
        }
        if pos.in_check(side_to_move.other()) {
            return Err(FenError::OpponentInCheck);
        }
        Ok(pos)
    }

    /// An en passant target is only real right behind a pawn of the side
    /// that just moved, on the rank its double push crosses.
    fn en_passant_follows_push(&self, ep: u8) -> bool {
        let pusher = self.side_to_move.other();
        let (crossed_rank, forward) = match pusher {
            Color::White => (2, 1),
            Color::Black => (5, -1),
        };
        if rank_of(ep) != crossed_rank || self.piece_at(ep).is_some() {
            return false;
        }
        sq(file_of(ep), crossed_rank + forward)
            .and_then(|s| self.piece_at(s))
            .is_some_and(|p| p == Piece::new(pusher, PieceKind::Pawn))
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.board[(rank * 8 + file) as usize] {
                    Some(pc) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(pc.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        let rights: String = [
            (self.castling.wk, 'K'),
            (self.castling.wq, 'Q'),
            (self.castling.bk, 'k'),
            (self.castling.bq, 'q'),
        ]
        .iter()
        .filter(|(held, _)| *held)
        .map(|(_, c)| *c)
        .collect();
        out.push_str(if rights.is_empty() { "-" } else { &rights });

        out.push(' ');
        match self.en_passant {
            Some(ep) => out.push_str(&sq_to_coord(ep)),
            None => out.push('-'),
        }
        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }

    /// Eight text rows, rank 8 first, one character per square (`.` when
    /// empty), each prefixed with its rank number.
    pub fn text_rows(&self) -> Vec<String> {
        (0..8)
            .rev()
            .map(|rank| {
                let cells: Vec<String> = (0..8)
                    .map(|file| {
                        self.board[(rank * 8 + file) as usize]
                            .map(|pc| pc.fen_char())
                            .unwrap_or('.')
                            .to_string()
                    })
                    .collect();
                format!("{} {}", rank + 1, cells.join(" "))
            })
            .collect()
    }

    pub fn king_sq(&self, c: Color) -> Option<u8> {
        (0..64u8).find(|&i| self.board[i as usize] == Some(Piece::new(c, PieceKind::King)))
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.board[sq as usize]
    }
    fn set_piece(&mut self, sq: u8, pc: Option<Piece>) {
        self.board[sq as usize] = pc;
    }

    /// Number of pieces of the given color and kind.
    pub fn count(&self, c: Color, kind: PieceKind) -> usize {
        self.board
            .iter()
            .filter(|sq| **sq == Some(Piece::new(c, kind)))
            .count()
    }

    /// Squares holding a piece of the given color and kind.
    pub fn squares_of(&self, c: Color, kind: PieceKind) -> impl Iterator<Item = u8> + '_ {
        let target = Some(Piece::new(c, kind));
        (0..64u8).filter(move |&s| self.board[s as usize] == target)
    }

    pub fn in_check(&self, c: Color) -> bool {
        let ksq = match self.king_sq(c) {
            Some(s) => s,
            None => return false,
        };
        self.is_square_attacked(ksq, c.other())
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    pub fn is_square_attacked(&self, target: u8, by: Color) -> bool {
        // Pawn attacks
        let tf = file_of(target);
        let tr = rank_of(target);
        let pawn_dirs: &[(i8, i8)] = match by {
            // A white pawn attacking `target` stands one rank below it.
            Color::White => &[(-1, -1), (1, -1)],
            Color::Black => &[(-1, 1), (1, 1)],
        };
        for (df, dr) in pawn_dirs {
            if let Some(s) = sq(tf + df, tr + dr)
                && self.piece_at(s) == Some(Piece::new(by, PieceKind::Pawn))
            {
                return true;
            }
        }

        for (df, dr) in KNIGHT_DELTAS {
            if let Some(s) = sq(tf + df, tr + dr)
                && self.piece_at(s) == Some(Piece::new(by, PieceKind::Knight))
            {
                return true;
            }
        }

        for (df, dr) in KING_DELTAS {
            if let Some(s) = sq(tf + df, tr + dr)
                && self.piece_at(s) == Some(Piece::new(by, PieceKind::King))
            {
                return true;
            }
        }

        // Sliding: bishop/rook/queen
        for (df, dr) in DIAGONALS {
            if let Some(pc) = self.first_piece_along(tf, tr, df, dr)
                && pc.color == by
                && (pc.kind == PieceKind::Bishop || pc.kind == PieceKind::Queen)
            {
                return true;
            }
        }
        for (df, dr) in ORTHOGONALS {
            if let Some(pc) = self.first_piece_along(tf, tr, df, dr)
                && pc.color == by
                && (pc.kind == PieceKind::Rook || pc.kind == PieceKind::Queen)
            {
                return true;
            }
        }

        false
    }

    fn first_piece_along(&self, f0: i8, r0: i8, df: i8, dr: i8) -> Option<Piece> {
        let mut f = f0 + df;
        let mut r = r0 + dr;
        while let Some(s) = sq(f, r) {
            if let Some(pc) = self.piece_at(s) {
                return Some(pc);
            }
            f += df;
            r += dr;
        }
        None
    }

    /// Derives the move's flags from this position.
    pub fn classify(&self, mv: Move) -> MoveFlags {
        let Some(moved) = self.piece_at(mv.from) else {
            return MoveFlags::default();
        };
        let is_pawn = moved.kind == PieceKind::Pawn;
        let en_passant = is_pawn
            && self.en_passant == Some(mv.to)
            && file_of(mv.from) != file_of(mv.to)
            && self.piece_at(mv.to).is_none();
        MoveFlags {
            capture: self.piece_at(mv.to).is_some() || en_passant,
            en_passant,
            castle: moved.kind == PieceKind::King && (file_of(mv.to) - file_of(mv.from)).abs() == 2,
            double_push: is_pawn && (rank_of(mv.to) - rank_of(mv.from)).abs() == 2,
            promotion: mv.promo.is_some(),
        }
    }

    /// Plays a move after checking it against the legal move list.
    pub fn apply(&self, mv: Move) -> Result<Position, IllegalMoveError> {
        if legal_moves(self).contains(&mv) {
            Ok(self.play(mv))
        } else {
            Err(IllegalMoveError { mv })
        }
    }

    /// Plays a move without legality checking.
    ///
    /// Only call this with moves produced by the move generator for this
    /// position; anything else leaves the result undefined.
    pub fn play(&self, mv: Move) -> Position {
        let mut next = self.clone();
        next.play_in_place(mv);
        next
    }

    fn play_in_place(&mut self, mv: Move) {
        let from = mv.from;
        let to = mv.to;
        let flags = self.classify(mv);
        let moved = self.piece_at(from).expect("no piece on from-square");

        self.en_passant = None;

        // Halfmove clock reset on capture or pawn move
        let reset_hmc = moved.kind == PieceKind::Pawn || flags.capture;

        if flags.en_passant {
            // the captured pawn sits beside the mover, not on the target square
            if let Some(cs) = sq(file_of(to), rank_of(from)) {
                self.set_piece(cs, None);
            }
        }

        self.set_piece(from, None);
        let placed = match mv.promo {
            Some(kind) if moved.kind == PieceKind::Pawn => Piece::new(moved.color, kind),
            _ => moved,
        };
        self.set_piece(to, Some(placed));

        if flags.castle {
            // White: e1->g1 rook h1->f1, e1->c1 rook a1->d1
            // Black: e8->g8 rook h8->f8, e8->c8 rook a8->d8
            let rank = rank_of(from);
            let (rook_file_from, rook_file_to) = if file_of(to) > file_of(from) {
                (7, 5)
            } else {
                (0, 3)
            };
            if let (Some(rf), Some(rt)) = (sq(rook_file_from, rank), sq(rook_file_to, rank)) {
                let rook = self.piece_at(rf);
                self.set_piece(rf, None);
                self.set_piece(rt, rook);
            }
        }

        // Rights go away when the king or a rook leaves home, or a rook is captured at home.
        if moved.kind == PieceKind::King {
            match moved.color {
                Color::White => {
                    self.castling.wk = false;
                    self.castling.wq = false;
                }
                Color::Black => {
                    self.castling.bk = false;
                    self.castling.bq = false;
                }
            }
        }
        for corner in [from, to] {
            match corner {
                0 => self.castling.wq = false,
                7 => self.castling.wk = false,
                56 => self.castling.bq = false,
                63 => self.castling.bk = false,
                _ => {}
            }
        }

        if flags.double_push {
            // ep square is the square passed over
            let ep_rank = (rank_of(from) + rank_of(to)) / 2;
            self.en_passant = sq(file_of(from), ep_rank);
        }

        self.halfmove_clock = if reset_hmc {
            0
        } else {
            self.halfmove_clock + 1
        };

        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.other();
    }

    /// Zobrist key over placement, side to move, castling rights and the
    /// en-passant target. Equal keys identify repeated positions.
    pub fn position_hash(&self) -> u64 {
        let mut h = 0u64;
        for (i, pc) in self.board.iter().enumerate() {
            if let Some(pc) = pc {
                h ^= ZOBRIST.piece_key(*pc, i as u8);
            }
        }
        if self.side_to_move == Color::Black {
            h ^= ZOBRIST.side_to_move;
        }
        for (i, held) in self.castling.as_array().into_iter().enumerate() {
            if held {
                h ^= ZOBRIST.castling_key(i);
            }
        }
        if let Some(ep) = self.en_passant {
            h ^= ZOBRIST.ep_key(file_of(ep) as u8);
        }
        h
    }

    /// Not enough material for either side to ever deliver mate:
    /// K v K, K+minor v K, and K+B v K+B with same-coloured bishops.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors: Vec<(Color, PieceKind, u8)> = Vec::new();
        for (i, pc) in self.board.iter().enumerate() {
            let Some(pc) = pc else { continue };
            match pc.kind {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => minors.push((pc.color, pc.kind, i as u8)),
                _ => return false,
            }
        }
        match minors.as_slice() {
            [] | [_] => true,
            [(c1, PieceKind::Bishop, s1), (c2, PieceKind::Bishop, s2)] => {
                c1 != c2 && is_dark_square(*s1) == is_dark_square(*s2)
            }
            _ => false,
        }
    }
}

pub(crate) const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];

pub(crate) const KING_DELTAS: [(i8, i8); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

pub(crate) const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub(crate) const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
