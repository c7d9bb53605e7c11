//! Game-end detection through the public API: stalemate, the fifty-move
//! rule, threefold repetition, insufficient material and checkmate.

use chess_core::{Color, GameStatus, Position, game_status, legal_moves, parse_move_input};

fn fen(s: &str) -> Position {
    Position::from_fen(s).unwrap()
}

/// Plays `line` from `start`, returning the final position and the keys of
/// every position before it.
fn play_line(start: Position, line: &[&str]) -> (Position, Vec<u64>) {
    let mut pos = start;
    let mut history = Vec::new();
    for text in line {
        let mv = parse_move_input(&pos, text).unwrap();
        history.push(pos.position_hash());
        pos = pos.apply(mv).unwrap();
    }
    (pos, history)
}

// =============================================================================
// Stalemate
// =============================================================================

#[test]
fn test_stalemate_king_in_corner() {
    let pos = fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
    assert!(legal_moves(&pos).is_empty());
    assert!(!pos.in_check(Color::Black));
    assert_eq!(game_status(&pos, &[]), GameStatus::Stalemate);
}

#[test]
fn test_stalemate_king_and_pawn_endgame() {
    let pos = fen("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1");
    assert_eq!(game_status(&pos, &[]), GameStatus::Stalemate);
    assert!(game_status(&pos, &[]).is_draw());
}

// =============================================================================
// Fifty-move rule
// =============================================================================

#[test]
fn test_fifty_move_rule_boundary() {
    let at_99 = fen("8/8/8/4k3/8/4K3/8/4R3 w - - 99 60");
    assert_eq!(game_status(&at_99, &[]), GameStatus::Ongoing);

    let (at_100, history) = play_line(at_99, &["e1 e2"]);
    assert_eq!(at_100.halfmove_clock, 100);
    assert_eq!(game_status(&at_100, &history), GameStatus::DrawByFiftyMove);
}

#[test]
fn test_fifty_move_clock_resets_on_pawn_move() {
    let pos = fen("8/8/8/4k3/8/3K4/4P3/8 w - - 99 60");
    let (next, history) = play_line(pos, &["e2 e4"]);
    assert_eq!(next.halfmove_clock, 0);
    assert_eq!(game_status(&next, &history), GameStatus::Ongoing);
}

// =============================================================================
// Threefold repetition
// =============================================================================

#[test]
fn test_threefold_after_knight_shuffle() {
    let shuffle = ["b1 c3", "b8 c6", "c3 b1", "c6 b8"];
    let twice: Vec<&str> = shuffle.iter().chain(shuffle.iter()).copied().collect();
    let (pos, history) = play_line(Position::startpos(), &twice);
    assert_eq!(game_status(&pos, &history), GameStatus::DrawByRepetition);

    // One ply short of the third occurrence.
    let (pos, history) = play_line(Position::startpos(), &twice[..7]);
    assert_eq!(game_status(&pos, &history), GameStatus::Ongoing);
}

#[test]
fn test_lost_castling_rights_break_repetition() {
    // The king walks out and back: same placement, fewer rights.
    let start = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let walk = ["e1 e2", "e8 e7", "e2 e1", "e7 e8"];
    let line: Vec<&str> = walk.iter().cycle().take(12).copied().collect();

    // After two walks the placement has recurred three times, but the first
    // occurrence still had castling rights.
    let (pos, history) = play_line(start.clone(), &line[..8]);
    assert_ne!(history[0], pos.position_hash());
    assert_eq!(game_status(&pos, &history), GameStatus::Ongoing);

    let (pos, history) = play_line(start, &line);
    assert_eq!(history.iter().filter(|&&k| k == pos.position_hash()).count(), 2);
    assert_eq!(game_status(&pos, &history), GameStatus::DrawByRepetition);
}

// =============================================================================
// Insufficient material
// =============================================================================

#[test]
fn test_insufficient_material_cases() {
    let draws = [
        "8/8/8/4k3/8/4K3/8/8 w - - 0 1",
        "8/8/8/4k3/8/4KB2/8/8 w - - 0 1",
        "8/8/8/4k3/8/4KN2/8/8 w - - 0 1",
        "8/8/4n3/4k3/8/4K3/8/8 w - - 0 1",
        "5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1",
    ];
    for s in draws {
        assert_eq!(game_status(&fen(s), &[]), GameStatus::DrawByInsufficientMaterial, "{s}");
    }

    let playable = [
        "2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1",
        "8/8/8/4k3/8/4K3/4P3/8 w - - 0 1",
        "8/8/8/4k3/8/4K3/8/4R3 w - - 0 1",
        "8/8/8/4k3/8/4K3/3NN3/8 w - - 0 1",
    ];
    for s in playable {
        assert_eq!(game_status(&fen(s), &[]), GameStatus::Ongoing, "{s}");
    }
}

// =============================================================================
// Checkmate
// =============================================================================

#[test]
fn test_scholars_mate() {
    let pos = fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4");
    let status = game_status(&pos, &[]);
    assert_eq!(status, GameStatus::Checkmate(Color::Black));
    assert_eq!(status.winner(), Some(Color::White));
    assert!(!status.is_draw());
}

#[test]
fn test_check_is_not_checkmate() {
    let pos = fen("rnbqkbnr/ppppp1pp/8/5p1Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 1 2");
    assert!(pos.in_check(Color::Black));
    assert_eq!(game_status(&pos, &[]), GameStatus::Ongoing);
}
