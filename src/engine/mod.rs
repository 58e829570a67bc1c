//! Score-state engine and leaderboard ranking.
//!
//! [`ScoreEngine`] owns the in-memory session state, applies every
//! mutation, runs the per-player diff decay timers, and keeps the
//! durable copy in sync after each change.

mod leaderboard;
mod score_engine;

pub use leaderboard::{standings, Standing};
pub use score_engine::{ScoreEngine, DIFF_DECAY_WINDOW};
