use super::*;
use chess_core::{CastlingRights, Piece};

fn mirror(pos: &Position) -> Position {
    let mut out = pos.clone();
    for s in 0..64u8 {
        out.board[(s ^ 56) as usize] = pos
            .piece_at(s)
            .map(|pc| Piece::new(pc.color.other(), pc.kind));
    }
    out.side_to_move = pos.side_to_move.other();
    out.castling = CastlingRights {
        wk: pos.castling.bk,
        wq: pos.castling.bq,
        bk: pos.castling.wk,
        bq: pos.castling.wq,
    };
    out.en_passant = pos.en_passant.map(|s| s ^ 56);
    out
}

#[test]
fn test_startpos_is_balanced() {
    let f = extract(&Position::startpos());
    // Only the bias survives: every other term cancels between the sides.
    assert_eq!(f.entries(), &[(BIAS, 1.0)]);
}

#[test]
fn test_indices_are_ascending_and_in_range() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -";
    let pos = Position::from_fen(fen).unwrap();
    let f = extract(&pos);
    assert!(f.entries().windows(2).all(|w| w[0].0 < w[1].0));
    assert!(f.entries().iter().all(|(i, _)| *i < NUM_FEATURES));
    assert_eq!(f.to_dense().len(), NUM_FEATURES);
}

#[test]
fn test_material_is_relative_to_side_to_move() {
    // White is a queen up.
    let white_to_move = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
    let black_to_move = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
    let queen = MATERIAL + 4;
    assert_eq!(extract(&white_to_move).get(queen), 1.0);
    assert_eq!(extract(&black_to_move).get(queen), -1.0);
}

#[test]
fn test_mirrored_position_has_same_features() {
    let fens = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -",
    ];
    for fen in fens {
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(extract(&pos), extract(&mirror(&pos)), "{fen}");
    }
}

#[test]
fn test_in_check_feature() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").unwrap();
    assert_eq!(extract(&pos).get(IN_CHECK), 1.0);
    assert_eq!(extract(&Position::startpos()).get(IN_CHECK), 0.0);
}

#[test]
fn test_pawn_structure_terms() {
    // White: doubled c-pawns and an h-pawn. Black: a lone e-pawn.
    let pos = Position::from_fen("4k3/4p3/8/7P/8/2P5/2P5/4K3 w - - 0 1").unwrap();
    let f = extract(&pos);
    assert_eq!(f.get(DOUBLED_PAWNS), 1.0);
    // Every pawn on the board is isolated and passed: three for White, one for Black.
    assert_eq!(f.get(ISOLATED_PAWNS), 2.0);
    assert_eq!(f.get(PASSED_PAWNS), 2.0);
}

#[test]
fn test_pawn_shield_and_king_pressure() {
    let sheltered = Position::from_fen("6k1/8/8/8/8/8/5PPP/6K1 w - - 0 1").unwrap();
    assert_eq!(extract(&sheltered).get(PAWN_SHIELD), 3.0);

    // Black rook on the second rank presses the white king's zone.
    let pressed = Position::from_fen("6k1/8/8/8/8/8/r7/6K1 w - - 0 1").unwrap();
    assert!(extract(&pressed).get(KING_PRESSURE) > 0.0);
}
