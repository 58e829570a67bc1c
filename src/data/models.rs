//! Data models for the game session

use serde::{Deserialize, Serialize};

/// Number of players a fresh session starts with
pub const DEFAULT_NUM_PLAYERS: usize = 4;

/// A single player on the roster
///
/// `total_score` is the durable running score. `diff` is the transient
/// net change accumulated since the current scoring streak began, and
/// `last_score` is the baseline total that streak is measured against.
/// Outside the atomic update step, `diff == total_score - last_score`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable identifier, assigned at creation (`player-1`, `player-2`, ...)
    pub id: String,
    /// User-editable display name
    pub name: String,
    /// Authoritative running score
    pub total_score: i64,
    /// Baseline total the current streak is measured against
    pub last_score: i64,
    /// Net change accumulated since the streak began
    pub diff: i64,
}

impl Player {
    /// Create a player with the default id/name for a 1-indexed roster slot
    pub fn with_index(index: usize) -> Self {
        Self {
            id: format!("player-{}", index),
            name: format!("Player {}", index),
            total_score: 0,
            last_score: 0,
            diff: 0,
        }
    }

    /// Apply a score delta, starting or continuing a streak.
    ///
    /// A `diff` of 0 means no streak is running, so the baseline moves to
    /// the pre-delta total. A non-zero `diff` keeps the existing baseline
    /// and lets rapid successive deltas accumulate into one visible change.
    pub fn apply_delta(&mut self, delta: i64) {
        let previous_total = self.total_score;
        let new_total = previous_total + delta;
        let baseline = if self.diff == 0 {
            previous_total
        } else {
            self.last_score
        };

        self.total_score = new_total;
        self.last_score = baseline;
        self.diff = new_total - baseline;
    }

    /// Close the current streak: zero the diff and move the baseline up
    /// to the current total. Idempotent.
    pub fn settle_diff(&mut self) {
        self.last_score = self.total_score;
        self.diff = 0;
    }
}

/// Tunable game settings, persisted alongside the roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Amount applied per increment/decrement action (callers keep this >= 1)
    pub increment_step: i64,
    /// Number of players on the roster (callers keep this >= 2)
    pub num_players: usize,
    /// Score every player is set to on a game reset.
    /// Absent on records written before the field existed, so default to 0.
    #[serde(default)]
    pub default_score: i64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            increment_step: 1,
            num_players: DEFAULT_NUM_PLAYERS,
            default_score: 0,
        }
    }
}

/// The single unit of persistence: full roster plus settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSession {
    pub players: Vec<Player>,
    pub settings: GameSettings,
}

impl GameSession {
    /// Create a fresh session with `count` default players and default settings
    pub fn with_default_players(count: usize) -> Self {
        Self {
            players: default_players(count),
            settings: GameSettings {
                num_players: count,
                ..GameSettings::default()
            },
        }
    }
}

/// Build a default roster of `count` players, 1-indexed ids and names
pub fn default_players(count: usize) -> Vec<Player> {
    (1..=count).map(Player::with_index).collect()
}
