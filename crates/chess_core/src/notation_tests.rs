use super::*;

#[test]
fn test_parse_two_squares() {
    let text = parse_move_text("a2 a4").unwrap();
    assert_eq!(text.from, coord_to_sq("a2").unwrap());
    assert_eq!(text.to, coord_to_sq("a4").unwrap());
    assert_eq!(text.promo, None);
}

#[test]
fn test_parse_is_case_insensitive_and_trims() {
    assert_eq!(parse_move_text("  E2   E4 ").unwrap(), parse_move_text("e2 e4").unwrap());
}

#[test]
fn test_parse_compact_and_promotion_forms() {
    let spaced = parse_move_text("e7 e8 q").unwrap();
    let compact = parse_move_text("e7e8q").unwrap();
    assert_eq!(spaced, compact);
    assert_eq!(spaced.promo, Some(PieceKind::Queen));
    assert_eq!(parse_move_text("e7 e8 N").unwrap().promo, Some(PieceKind::Knight));
}

#[test]
fn test_parse_rejects_bad_input() {
    assert_eq!(parse_move_text(""), Err(InvalidMoveInputError::WrongTokenCount(0)));
    assert_eq!(parse_move_text("e2"), Err(InvalidMoveInputError::WrongTokenCount(1)));
    assert_eq!(
        parse_move_text("e2 e4 q x"),
        Err(InvalidMoveInputError::WrongTokenCount(4))
    );
    assert_eq!(
        parse_move_text("i2 e4"),
        Err(InvalidMoveInputError::BadSquare("i2".to_string()))
    );
    assert_eq!(
        parse_move_text("e0 e4"),
        Err(InvalidMoveInputError::BadSquare("e0".to_string()))
    );
    assert_eq!(
        parse_move_text("e2 e9"),
        Err(InvalidMoveInputError::BadSquare("e9".to_string()))
    );
    assert_eq!(
        parse_move_text("e7 e8 k"),
        Err(InvalidMoveInputError::BadPromotion("k".to_string()))
    );
}

#[test]
fn test_resolve_rejects_illegal_move() {
    let pos = Position::startpos();
    let err = parse_move_input(&pos, "e2 e5").unwrap_err();
    assert!(matches!(err, MoveInputError::Illegal(_)));
    let err = parse_move_input(&pos, "e7 e5").unwrap_err();
    assert!(matches!(err, MoveInputError::Illegal(_)));
}

#[test]
fn test_missing_promotion_letter_defaults_to_queen() {
    let pos = Position::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
    let mv = parse_move_input(&pos, "e7 e8").unwrap();
    assert_eq!(mv.promo, Some(PieceKind::Queen));
    let mv = parse_move_input(&pos, "e7 e8 r").unwrap();
    assert_eq!(mv.promo, Some(PieceKind::Rook));
}

#[test]
fn test_promotion_letter_on_normal_move_is_illegal() {
    let pos = Position::startpos();
    assert!(parse_move_input(&pos, "e2 e4 q").is_err());
}

#[test]
fn test_san_basics() {
    let pos = Position::startpos();
    let e4 = parse_move_input(&pos, "e2 e4").unwrap();
    assert_eq!(san(&pos, e4), "e4");
    let nf3 = parse_move_input(&pos, "g1 f3").unwrap();
    assert_eq!(san(&pos, nf3), "Nf3");
    assert_eq!(move_to_coord(nf3), "g1f3");
}

#[test]
fn test_san_castle_capture_and_mate() {
    let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let castle = parse_move_input(&pos, "e1 g1").unwrap();
    assert_eq!(san(&pos, castle), "O-O");
    let long = parse_move_input(&pos, "e1 c1").unwrap();
    assert_eq!(san(&pos, long), "O-O-O");

    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1").unwrap();
    let mate = parse_move_input(&pos, "e1 e8").unwrap();
    assert_eq!(san(&pos, mate), "Re8#");

    let pos = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
    let take = parse_move_input(&pos, "e4 d5").unwrap();
    assert_eq!(san(&pos, take), "exd5");
}

#[test]
fn test_san_disambiguates_by_file() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
    let mv = parse_move_input(&pos, "a1 d1").unwrap();
    assert_eq!(san(&pos, mv), "Rad1");
}
