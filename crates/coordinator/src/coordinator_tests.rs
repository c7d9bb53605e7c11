use super::*;
use chess_core::MoveInputError;
use selfplay_engine::{SearchConfig, TrainingConfig};
use std::time::Duration;

fn quick_config() -> AppConfig {
    AppConfig {
        search: SearchConfig {
            max_depth: 1,
            move_time_ms: 500,
        },
        training: TrainingConfig {
            seed: Some(3),
            ply_cap: 16,
            ..TrainingConfig::default()
        },
        ..AppConfig::default()
    }
}

fn coordinator(config: AppConfig) -> (Coordinator, mpsc::UnboundedReceiver<DisplayEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Coordinator::new(config, tx).unwrap(), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<DisplayEvent>) -> Vec<DisplayEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

async fn deliver_engine_reply(c: &mut Coordinator) {
    let reply = tokio::time::timeout(Duration::from_secs(10), c.replies_rx.recv())
        .await
        .unwrap()
        .unwrap();
    c.on_engine_reply(reply);
}

#[test]
fn test_starts_in_menu() {
    let (mut c, _rx) = coordinator(quick_config());
    assert_eq!(c.phase(), Phase::MainMenu);
    assert!(c.game().is_none());
    assert!(!c.is_training());

    let err = c.submit_move("e2 e4").unwrap_err();
    assert!(matches!(err, CoordinatorError::NotAwaitingMove(Phase::MainMenu)));
}

#[test]
fn test_rejects_invalid_config() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let config = AppConfig {
        start_fen: Some("8/8/8/8/8/8/8/8 w - - 0 1".to_string()),
        ..quick_config()
    };
    assert!(matches!(Coordinator::new(config, tx), Err(ConfigError::InvalidFen(_))));
}

#[tokio::test]
async fn test_invalid_input_keeps_phase() {
    let (mut c, mut rx) = coordinator(quick_config());
    c.start_game().unwrap();
    assert_eq!(c.phase(), Phase::InGame(Turn::AwaitingHumanMove));
    drain(&mut rx);

    let err = c.submit_move("e2 e5").unwrap_err();
    assert!(matches!(err, CoordinatorError::Input(MoveInputError::Illegal(_))));
    let err = c.submit_move("hello").unwrap_err();
    assert!(matches!(err, CoordinatorError::Input(MoveInputError::Invalid(_))));

    assert_eq!(c.phase(), Phase::InGame(Turn::AwaitingHumanMove));
    assert_eq!(c.game().unwrap().ply_count(), 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_rejected_input_becomes_notice() {
    let (mut c, mut rx) = coordinator(quick_config());
    c.start_game().unwrap();
    drain(&mut rx);

    assert!(c.handle_control(Control::Move("a1 a9".to_string())));
    let events = drain(&mut rx);
    assert!(matches!(events.as_slice(), [DisplayEvent::Notice { .. }]));
    assert_eq!(c.phase(), Phase::InGame(Turn::AwaitingHumanMove));
}

#[tokio::test]
async fn test_human_move_gets_engine_reply() {
    let (mut c, mut rx) = coordinator(quick_config());
    c.start_game().unwrap();
    c.submit_move("e2 e4").unwrap();
    assert_eq!(c.phase(), Phase::InGame(Turn::EngineThinking));
    assert!(c.submit_move("d2 d4").is_err());

    deliver_engine_reply(&mut c).await;
    assert_eq!(c.phase(), Phase::InGame(Turn::AwaitingHumanMove));

    let records = c.game().unwrap().records();
    assert_eq!(records.len(), 2);
    assert!(!records[0].by_engine);
    assert!(records[1].by_engine);
    assert_eq!(records[1].side, Color::Black);

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(e, DisplayEvent::Thought { depth: 1, .. })));
    let line = events.iter().find_map(|e| match e {
        DisplayEvent::Confidence { mv, line, .. } => Some((mv.clone(), line.clone())),
        _ => None,
    });
    let (mv, line) = line.unwrap();
    assert_eq!(line.first(), Some(&mv));
    assert_eq!(records[1].mv.to_string(), mv);
    assert!(events.iter().any(|e| matches!(
        e,
        DisplayEvent::HistoryEntry {
            ply: 2,
            by_engine: true,
            ..
        }
    )));
}

#[tokio::test]
async fn test_engine_opens_when_human_plays_black() {
    let (mut c, _rx) = coordinator(AppConfig {
        human_color: Color::Black,
        ..quick_config()
    });
    c.start_game().unwrap();
    assert_eq!(c.phase(), Phase::InGame(Turn::EngineThinking));

    deliver_engine_reply(&mut c).await;
    let game = c.game().unwrap();
    assert_eq!(game.ply_count(), 1);
    assert!(game.records()[0].by_engine);
    assert_eq!(game.side_to_move(), Color::Black);
    assert_eq!(c.phase(), Phase::InGame(Turn::AwaitingHumanMove));
}

#[tokio::test]
async fn test_menu_stops_training() {
    let (mut c, mut rx) = coordinator(quick_config());
    c.start_game().unwrap();
    assert!(c.is_training());

    c.return_to_menu();
    assert!(!c.is_training());
    assert!(c.game().is_none());
    assert_eq!(c.phase(), Phase::MainMenu);
    let events = drain(&mut rx);
    assert_eq!(
        events.last(),
        Some(&DisplayEvent::Phase {
            phase: Phase::MainMenu
        })
    );
}

#[tokio::test]
async fn test_search_result_after_leaving_is_discarded() {
    let (mut c, _rx) = coordinator(AppConfig {
        human_color: Color::Black,
        ..quick_config()
    });
    c.start_game().unwrap();
    c.return_to_menu();

    deliver_engine_reply(&mut c).await;
    assert_eq!(c.phase(), Phase::MainMenu);
    assert!(c.game().is_none());
}

#[tokio::test]
async fn test_mate_ends_game_and_training() {
    let (mut c, mut rx) = coordinator(AppConfig {
        start_fen: Some("6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1".to_string()),
        ..quick_config()
    });
    c.start_game().unwrap();
    c.submit_move("e1 e8").unwrap();

    assert_eq!(c.phase(), Phase::GameOver);
    assert!(!c.is_training());
    assert!(c.game().is_some());
    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        DisplayEvent::GameOver {
            status: GameStatus::Checkmate(Color::Black),
            winner: Some(Color::White),
            ..
        }
    )));

    let err = c.submit_move("g1 h1").unwrap_err();
    assert!(matches!(err, CoordinatorError::NotAwaitingMove(Phase::GameOver)));
}

#[tokio::test]
async fn test_finished_start_position_is_game_over() {
    let (mut c, _rx) = coordinator(AppConfig {
        start_fen: Some("4R1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1".to_string()),
        ..quick_config()
    });
    c.start_game().unwrap();
    assert_eq!(c.phase(), Phase::GameOver);
    assert_eq!(c.game().unwrap().status(), GameStatus::Checkmate(Color::Black));
}

#[tokio::test]
async fn test_new_game_replaces_old_one() {
    let (mut c, _rx) = coordinator(quick_config());
    c.start_game().unwrap();
    c.submit_move("e2 e4").unwrap();
    assert!(c.handle_control(Control::NewGame));

    assert_eq!(c.phase(), Phase::InGame(Turn::AwaitingHumanMove));
    assert_eq!(c.game().unwrap().ply_count(), 0);
    assert!(c.is_training());

    // The reply to the first game's search is dropped.
    deliver_engine_reply(&mut c).await;
    assert_eq!(c.game().unwrap().ply_count(), 0);
}

#[test]
fn test_finish_engine_turn_needs_engine_phase() {
    let (mut c, _rx) = coordinator(quick_config());
    let outcome = SearchOutcome {
        best_move: chess_core::Move::new(12, 28),
        score: 0.0,
        confidence: 0.0,
        depth: 1,
        nodes: 1,
        stopped: false,
        pv: vec![chess_core::Move::new(12, 28)],
        trace: Vec::new(),
    };
    assert!(matches!(
        c.finish_engine_turn(outcome),
        Err(CoordinatorError::NotAwaitingMove(Phase::MainMenu))
    ));
}

#[test]
fn test_about_and_quit() {
    let (mut c, mut rx) = coordinator(quick_config());
    assert!(c.handle_control(Control::About));
    assert_eq!(drain(&mut rx), vec![DisplayEvent::notice(ABOUT_TEXT)]);
    assert!(!c.handle_control(Control::Quit));
}
