//! Game session data access object (single-record store)

use super::models::{GameSession, GameSettings, Player};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Fixed key for the one stored session record
const SESSION_KEY: &str = "current";

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to encode session: {0}")]
    Encode(serde_json::Error),
    #[error("Failed to decode stored session: {0}")]
    Decode(serde_json::Error),
}

/// Data access object for the persisted game session.
///
/// Exactly one record exists, keyed `"current"`. Saves replace it
/// wholesale; there is no partial update and no multi-session history.
#[derive(Clone)]
pub struct SessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SessionStore {
    /// Create a new SessionStore
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Overwrite the stored record with the given snapshot
    pub fn save_session(&self, session: &GameSession) -> Result<(), SessionStoreError> {
        let players = serde_json::to_string(&session.players).map_err(SessionStoreError::Encode)?;
        let settings =
            serde_json::to_string(&session.settings).map_err(SessionStoreError::Encode)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO game_sessions (id, players, settings, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
               players = excluded.players,
               settings = excluded.settings,
               updated_at = excluded.updated_at",
            params![SESSION_KEY, players, settings, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Load the stored snapshot, or `None` if no record exists
    pub fn load_session(&self) -> Result<Option<GameSession>, SessionStoreError> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT players, settings FROM game_sessions WHERE id = ?1",
                params![SESSION_KEY],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((players_json, settings_json)) = row else {
            return Ok(None);
        };

        let players: Vec<Player> =
            serde_json::from_str(&players_json).map_err(SessionStoreError::Decode)?;
        let settings: GameSettings =
            serde_json::from_str(&settings_json).map_err(SessionStoreError::Decode)?;

        Ok(Some(GameSession { players, settings }))
    }

    /// Remove the stored record entirely
    pub fn clear_session(&self) -> Result<(), SessionStoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM game_sessions WHERE id = ?1",
            params![SESSION_KEY],
        )?;
        Ok(())
    }
}
