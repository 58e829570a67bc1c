//! Data persistence layer for score-pocket
//!
//! This module provides SQLite-based storage for the game session.

mod database;
mod migrations;
mod models;
mod session;

pub use database::{Database, DatabaseError};
pub use models::{default_players, GameSession, GameSettings, Player, DEFAULT_NUM_PLAYERS};
pub use session::{SessionStore, SessionStoreError};
