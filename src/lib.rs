//! score-pocket: a local score-tracking engine for multiplayer
//! tabletop-style games.
//!
//! The crate has two layers, consumed leaf-first:
//! - [`data`]: SQLite-backed persistence of a single session record
//!   (roster plus settings)
//! - [`engine`]: the in-memory authoritative state, its mutation
//!   operations, the decaying per-player diff indicators, and the
//!   fire-and-forget synchronization to durable storage
//!
//! Presentation is out of scope; a UI embeds [`ScoreEngine`], awaits
//! [`ScoreEngine::init`], and then reads snapshots and invokes the
//! mutation operations.

pub mod data;
pub mod engine;
pub mod util;

pub use data::{
    default_players, Database, DatabaseError, GameSession, GameSettings, Player, SessionStore,
    SessionStoreError, DEFAULT_NUM_PLAYERS,
};
pub use engine::{standings, ScoreEngine, Standing, DIFF_DECAY_WINDOW};
