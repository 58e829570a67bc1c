//! Integration tests for the engine-over-database session flow
//!
//! Tests the full lifecycle of initializing the engine from a real
//! SQLite database, mutating state, and picking the session back up
//! in a fresh engine as a restart would.

use std::time::Duration;

use score_pocket::{
    Database, GameSession, GameSettings, Player, ScoreEngine, SessionStore, DIFF_DECAY_WINDOW,
};
use tempfile::TempDir;

/// Create a test database in a temporary directory with its store
fn create_test_db() -> (Database, SessionStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::open(dir.path().join("test.db")).expect("Failed to open database");
    let store = SessionStore::new(db.connection());
    (db, store, dir)
}

/// Wait for a fire-and-forget save to land, polling the store
async fn wait_for_saved_total(store: &SessionStore, player_id: &str, total: i64) -> GameSession {
    for _ in 0..100 {
        if let Ok(Some(session)) = store.load_session() {
            let hit = session
                .players
                .iter()
                .any(|p| p.id == player_id && p.total_score == total);
            if hit {
                return session;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Session was never persisted with the expected score");
}

#[tokio::test]
async fn test_init_adopts_saved_session_with_diffs_closed() {
    let (db, store, _dir) = create_test_db();

    // A session saved mid-streak: diff still open, baseline stale
    let mut session = GameSession::with_default_players(3);
    session.players[0].total_score = 15;
    session.players[0].last_score = 10;
    session.players[0].diff = 5;
    session.players[1].name = "Maya".to_string();
    session.settings.increment_step = 3;
    store.save_session(&session).unwrap();

    let engine = ScoreEngine::with_database(&db);
    engine.init().await;

    assert!(engine.is_initialized());
    let players = engine.players();
    assert_eq!(players.len(), 3);
    assert_eq!(players[0].total_score, 15);
    assert_eq!(players[0].last_score, 15);
    assert_eq!(players[0].diff, 0);
    assert_eq!(players[1].name, "Maya");
    assert_eq!(engine.settings().increment_step, 3);
}

#[tokio::test]
async fn test_init_with_empty_database_builds_defaults() {
    let (db, store, _dir) = create_test_db();

    let engine = ScoreEngine::with_database(&db);
    engine.init().await;

    let players = engine.players();
    assert_eq!(players.len(), 4);
    assert!(players.iter().all(|p| p.total_score == 0));
    assert_eq!(engine.settings(), GameSettings::default());

    // Defaults are not written until the first mutation
    assert!(store.load_session().unwrap().is_none());
}

#[tokio::test]
async fn test_mutation_persists_and_survives_restart() {
    let (db, store, _dir) = create_test_db();

    let engine = ScoreEngine::with_database(&db);
    engine.init().await;
    engine.update_score("player-1", 1);
    engine.update_score("player-1", 1);
    engine.update_score("player-1", 1);

    let saved = wait_for_saved_total(&store, "player-1", 3).await;
    assert_eq!(saved.players[0].diff, 3);

    // A fresh engine on the same database adopts the totals but closes
    // the streak, as the decay timer did not survive the restart.
    let restarted = ScoreEngine::with_database(&db);
    restarted.init().await;
    let player = &restarted.players()[0];
    assert_eq!(player.total_score, 3);
    assert_eq!(player.diff, 0);
    assert_eq!(player.last_score, 3);
}

#[tokio::test]
async fn test_reset_game_targets_configured_default_score() {
    let (db, store, _dir) = create_test_db();

    let mut session = GameSession::with_default_players(4);
    session.players[0].total_score = 120;
    session.players[0].last_score = 120;
    session.players[2].name = "Lee".to_string();
    session.settings.default_score = 50;
    store.save_session(&session).unwrap();

    let engine = ScoreEngine::with_database(&db);
    engine.init().await;
    engine.reset_game();

    for player in engine.players() {
        assert_eq!(player.total_score, 50);
        assert_eq!(player.last_score, 50);
        assert_eq!(player.diff, 0);
    }
    // Names and ids survive the reset
    assert_eq!(engine.players()[2].name, "Lee");
    assert_eq!(engine.players()[0].id, "player-1");
}

#[tokio::test]
async fn test_resize_keeps_survivors_and_renumbers_additions() {
    let (db, _store, _dir) = create_test_db();

    let engine = ScoreEngine::with_database(&db);
    engine.init().await;
    engine.update_score("player-1", 7);
    engine.update_score("player-4", 2);

    engine.set_num_players(2);
    let players = engine.players();
    assert_eq!(
        players.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec!["player-1", "player-2"]
    );
    assert_eq!(players[0].total_score, 7);

    engine.set_num_players(4);
    let players = engine.players();
    assert_eq!(players.len(), 4);
    assert_eq!(players[2].id, "player-3");
    assert_eq!(players[3].id, "player-4");
    // The re-added slots start fresh; the old player-4's score is gone
    assert_eq!(players[3].total_score, 0);
    assert_eq!(players[0].total_score, 7);
}

#[tokio::test(start_paused = true)]
async fn test_decay_closes_streak_over_real_store() {
    let (db, _store, _dir) = create_test_db();

    let engine = ScoreEngine::with_database(&db);
    engine.init().await;
    engine.update_score("player-2", 4);
    assert_eq!(engine.players()[1].diff, 4);

    tokio::time::sleep(DIFF_DECAY_WINDOW + Duration::from_secs(1)).await;
    tokio::task::yield_now().await;

    let player = &engine.players()[1];
    assert_eq!(player.diff, 0);
    assert_eq!(player.total_score, 4);
    assert_eq!(player.last_score, 4);
}

#[tokio::test]
async fn test_store_round_trip_preserves_players_and_settings() {
    let (_db, store, _dir) = create_test_db();

    let mut session = GameSession::with_default_players(2);
    session.players[1] = Player {
        id: "player-2".to_string(),
        name: "Noa".to_string(),
        total_score: -3,
        last_score: -3,
        diff: 0,
    };
    session.settings.increment_step = 25;
    session.settings.default_score = -10;

    store.save_session(&session).unwrap();
    let loaded = store.load_session().unwrap().unwrap();

    assert_eq!(loaded, session);
}
