//! Tests for local play: turn order, computer turns and the event loop.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use xando::{
    Board, COMPUTER, Difficulty, GameConfig, GameMode, HUMAN, InvalidMove, LocalEvent, LocalGame,
    LocalSession, Outcome, Phase, Player,
};

#[test]
fn test_offline_multi_alternates_starting_with_x() {
    let mut session = LocalSession::offline_multi();
    // No line completes until the last move: X 0,2,5,6,7  O 1,3,4,8
    let moves = [0, 1, 2, 3, 5, 4, 6, 8, 7];
    for (n, index) in moves.into_iter().enumerate() {
        let expected = if n % 2 == 0 { Player::X } else { Player::O };
        assert_eq!(session.active_player(), Some(expected));
        session.play(index).unwrap();
    }

    let players = session
        .history()
        .iter()
        .map(|&(_, player)| player)
        .collect::<Vec<_>>();
    assert_eq!(
        players,
        [
            Player::X,
            Player::O,
            Player::X,
            Player::O,
            Player::X,
            Player::O,
            Player::X,
            Player::O,
            Player::X
        ]
    );
    assert_eq!(session.phase(), Phase::Terminal(Outcome::Draw));
}

#[test]
fn test_win_halts_further_moves() {
    let mut session = LocalSession::offline_multi();
    for index in [0, 3, 1, 4] {
        session.play(index).unwrap();
    }
    assert_eq!(
        session.play(2),
        Ok(Phase::Terminal(Outcome::Win(Player::X)))
    );
    assert!(!session.is_active());
    assert_eq!(session.play(8), Err(InvalidMove::GameOver));

    session.reset();
    assert_eq!(session.phase(), Phase::AwaitingMove(Player::X));
    assert!(session.history().is_empty());
}

#[test]
fn test_medium_opening_after_center_is_random_empty_cell() {
    for seed in 0..20 {
        let ai = Difficulty::Medium.strategy_with_rng(StdRng::seed_from_u64(seed));
        let mut session = LocalSession::solo_with_strategy(ai);
        session.play(4).unwrap();
        session.complete_ai_turn().unwrap();

        let (index, player) = session.history()[1];
        assert_eq!(player, COMPUTER);
        assert_ne!(index, 4);
    }
}

#[test]
fn test_session_from_config() {
    let config = GameConfig::default()
        .with_mode(GameMode::Solo)
        .with_difficulty(Difficulty::Hard);
    let session = LocalSession::from_config(&config);
    assert_eq!(session.mode(), GameMode::Solo);
    assert_eq!(session.difficulty(), Some(Difficulty::Hard));
    assert_eq!(session.phase(), Phase::AwaitingMove(HUMAN));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("xando.toml");
    std::fs::write(
        &path,
        "mode = \"SOLO\"\ndifficulty = \"EASY\"\nai_delay_ms = 0\nplayer_name = \"Player_12345\"\n",
    )
    .unwrap();

    let config = GameConfig::from_file(&path).unwrap();
    assert_eq!(*config.mode(), GameMode::Solo);
    assert_eq!(*config.difficulty(), Difficulty::Easy);
    assert_eq!(config.ai_delay(), Duration::ZERO);
    assert_eq!(config.player_name().as_deref(), Some("Player_12345"));
    assert_eq!(config.collection(), "games");
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(GameConfig::from_file(dir.path().join("absent.toml")).is_err());
}

async fn next(game: &mut LocalGame) -> LocalEvent {
    tokio::time::timeout(Duration::from_secs(5), game.next_event())
        .await
        .expect("event within timeout")
        .expect("game still running")
}

#[tokio::test]
async fn test_solo_game_with_zero_delay() {
    let mut game = LocalGame::spawn(LocalSession::solo(Difficulty::Hard), Duration::ZERO);

    game.play(0).unwrap();
    assert!(matches!(
        next(&mut game).await,
        LocalEvent::MoveApplied { player: Player::X, index: 0, .. }
    ));
    assert_eq!(next(&mut game).await, LocalEvent::AiThinking);
    match next(&mut game).await {
        LocalEvent::MoveApplied {
            player,
            index,
            board,
        } => {
            assert_eq!(player, COMPUTER);
            assert_eq!(index, 4);
            assert_eq!(board.count(Player::X), 1);
            assert_eq!(board.count(Player::O), 1);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    game.play(0).unwrap();
    assert!(matches!(
        next(&mut game).await,
        LocalEvent::Rejected(InvalidMove::Illegal(_))
    ));

    game.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_computer_move() {
    let mut game = LocalGame::spawn(
        LocalSession::solo(Difficulty::Hard),
        Duration::from_millis(500),
    );

    game.play(0).unwrap();
    assert!(matches!(next(&mut game).await, LocalEvent::MoveApplied { .. }));
    assert_eq!(next(&mut game).await, LocalEvent::AiThinking);

    game.play(1).unwrap();
    assert_eq!(
        next(&mut game).await,
        LocalEvent::Rejected(InvalidMove::AiThinking)
    );

    game.reset().unwrap();
    assert_eq!(next(&mut game).await, LocalEvent::Reset);

    // Well past the delay, the canceled move never lands.
    let quiet = tokio::time::timeout(Duration::from_secs(2), game.next_event()).await;
    assert!(quiet.is_err());

    game.play(4).unwrap();
    match next(&mut game).await {
        LocalEvent::MoveApplied { player, board, .. } => {
            assert_eq!(player, HUMAN);
            let mut expected = Board::new();
            expected.place(4, HUMAN).unwrap();
            assert_eq!(board, expected);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    game.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_computer_answers_after_delay() {
    let mut game = LocalGame::spawn(
        LocalSession::solo(Difficulty::Hard),
        Duration::from_millis(500),
    );
    game.play(4).unwrap();
    assert!(matches!(next(&mut game).await, LocalEvent::MoveApplied { .. }));
    assert_eq!(next(&mut game).await, LocalEvent::AiThinking);

    let start = tokio::time::Instant::now();
    assert!(matches!(
        next(&mut game).await,
        LocalEvent::MoveApplied { player: Player::O, .. }
    ));
    assert!(start.elapsed() >= Duration::from_millis(500));

    game.shutdown().await;
}
