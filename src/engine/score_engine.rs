//! Score-state engine: the single authority over players and settings.
//!
//! All mutations go through this engine. Each one updates the in-memory
//! state synchronously, then dispatches a fire-and-forget write of the
//! full session snapshot. Per-player "diff" indicators decay after a
//! quiet period via cancellable timer tasks, one pending per player at
//! most.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::data::{default_players, GameSession, GameSettings, Player, SessionStore};

/// Quiet period after which an unchanged diff streak is closed
pub const DIFF_DECAY_WINDOW: Duration = Duration::from_secs(5);

/// Handle to the score-state engine, shared between the UI lifecycle
/// owner and the engine's own timer tasks.
///
/// Mutation operations are undefined before [`ScoreEngine::init`]
/// resolves; callers gate on [`ScoreEngine::is_initialized`].
#[derive(Clone)]
pub struct ScoreEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    state: Mutex<EngineState>,
    /// `None` when the database could not be opened; the engine stays
    /// fully usable and only durability is lost.
    store: Option<SessionStore>,
    decay_window: Duration,
}

#[derive(Default)]
struct EngineState {
    players: Vec<Player>,
    settings: GameSettings,
    initialized: bool,
    /// At most one pending decay timer per player id
    diff_timers: HashMap<String, JoinHandle<()>>,
}

impl ScoreEngine {
    /// Create an engine backed by the database in the default location.
    ///
    /// A database that fails to open is treated the same as an empty
    /// one: the condition is logged and the engine runs memory-only.
    pub fn new() -> Self {
        let store = match crate::data::Database::open_default() {
            Ok(db) => Some(SessionStore::new(db.connection())),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open database, running without persistence");
                None
            }
        };
        Self::with_store(store, DIFF_DECAY_WINDOW)
    }

    /// Create an engine backed by an already-open database
    pub fn with_database(db: &crate::data::Database) -> Self {
        Self::with_store(Some(SessionStore::new(db.connection())), DIFF_DECAY_WINDOW)
    }

    /// Create an engine with an explicit store and decay window.
    ///
    /// Production callers use [`ScoreEngine::new`]; this exists so
    /// embedders and tests can control storage and timing.
    pub fn with_store(store: Option<SessionStore>, decay_window: Duration) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                state: Mutex::new(EngineState::default()),
                store,
                decay_window,
            }),
        }
    }

    /// Load the persisted session, or construct the default one.
    ///
    /// A loaded session is adopted verbatim except that every diff is
    /// forced to 0 and each baseline moves up to the current total:
    /// decay timers are not persisted, so any in-flight streak from a
    /// previous run is considered closed. Load failures fall back to
    /// defaults and are never fatal. No-op once initialized.
    pub async fn init(&self) {
        if self.is_initialized() {
            tracing::debug!("Engine already initialized");
            return;
        }

        let loaded = match self.inner.store.clone() {
            Some(store) => match tokio::task::spawn_blocking(move || store.load_session()).await {
                Ok(Ok(session)) => session,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Failed to load session, starting with defaults");
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Session load task failed, starting with defaults");
                    None
                }
            },
            None => None,
        };

        let mut state = self.inner.state.lock();
        match loaded {
            Some(session) => {
                state.players = session.players;
                for player in &mut state.players {
                    player.settle_diff();
                }
                state.settings = session.settings;
            }
            None => {
                let settings = GameSettings::default();
                state.players = default_players(settings.num_players);
                state.settings = settings;
            }
        }
        state.initialized = true;
    }

    /// Whether [`ScoreEngine::init`] has resolved
    pub fn is_initialized(&self) -> bool {
        self.inner.state.lock().initialized
    }

    /// Snapshot of the roster, in order
    pub fn players(&self) -> Vec<Player> {
        self.inner.state.lock().players.clone()
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> GameSettings {
        self.inner.state.lock().settings.clone()
    }

    /// Apply a score delta to one player and (re)arm their decay timer.
    ///
    /// Rapid successive calls within the decay window accumulate into a
    /// single visible diff instead of flickering per call: the pending
    /// timer is cancelled and replaced on every call, last writer wins.
    pub fn update_score(&self, player_id: &str, delta: i64) {
        {
            let mut state = self.inner.state.lock();
            if let Some(handle) = state.diff_timers.remove(player_id) {
                handle.abort();
            }

            let Some(player) = state.players.iter_mut().find(|p| p.id == player_id) else {
                tracing::warn!(player_id, "update_score for unknown player");
                return;
            };
            player.apply_delta(delta);

            let handle = self.spawn_decay_timer(player_id.to_string());
            state.diff_timers.insert(player_id.to_string(), handle);
        }
        self.schedule_save();
    }

    /// Close a player's diff streak: diff back to 0, baseline moved up
    /// to the current total. Cancels any pending decay timer. Idempotent.
    pub fn reset_player_diff(&self, player_id: &str) {
        {
            let mut state = self.inner.state.lock();
            if let Some(handle) = state.diff_timers.remove(player_id) {
                handle.abort();
            }
            if let Some(player) = state.players.iter_mut().find(|p| p.id == player_id) {
                player.settle_diff();
            }
        }
        self.schedule_save();
    }

    /// Replace the display name of the matching player.
    ///
    /// The caller is responsible for trimming and rejecting empty names.
    pub fn update_player_name(&self, player_id: &str, name: impl Into<String>) {
        {
            let mut state = self.inner.state.lock();
            let name = name.into();
            if let Some(player) = state.players.iter_mut().find(|p| p.id == player_id) {
                player.name = name;
            }
        }
        self.schedule_save();
    }

    /// Replace the per-action increment step. Callers keep this >= 1.
    pub fn set_increment_step(&self, step: i64) {
        {
            let mut state = self.inner.state.lock();
            state.settings.increment_step = step;
        }
        self.schedule_save();
    }

    /// Replace names positionally for every index below `names.len()`;
    /// players beyond that keep their existing name.
    pub fn set_player_names(&self, names: &[String]) {
        {
            let mut state = self.inner.state.lock();
            for (player, name) in state.players.iter_mut().zip(names) {
                player.name = name.clone();
            }
        }
        self.schedule_save();
    }

    /// Resize the roster to `num` players. Callers keep this >= 2.
    ///
    /// Growing appends fresh players continuing the numeric id sequence;
    /// shrinking keeps the stable prefix and cancels decay timers for
    /// every dropped player. Retained players keep their scores.
    pub fn set_num_players(&self, num: usize) {
        {
            let mut state = self.inner.state.lock();
            let current = state.players.len();
            if num > current {
                for index in current + 1..=num {
                    state.players.push(Player::with_index(index));
                }
            } else if num < current {
                let dropped: Vec<String> = state.players.drain(num..).map(|p| p.id).collect();
                for id in &dropped {
                    if let Some(handle) = state.diff_timers.remove(id) {
                        handle.abort();
                    }
                }
            }
            state.settings.num_players = num;
        }
        self.schedule_save();
    }

    /// Reset every player's scores to the configured default score,
    /// cancelling all pending decay timers. Names and ids are preserved.
    pub fn reset_game(&self) {
        {
            let mut state = self.inner.state.lock();
            for (_, handle) in state.diff_timers.drain() {
                handle.abort();
            }
            let target = state.settings.default_score;
            for player in &mut state.players {
                player.total_score = target;
                player.last_score = target;
                player.diff = 0;
            }
        }
        self.schedule_save();
    }

    /// Arm a decay timer for one player. The handle goes into the timer
    /// map; whoever replaces or removes it must abort it.
    fn spawn_decay_timer(&self, player_id: String) -> JoinHandle<()> {
        let engine = self.clone();
        let window = self.inner.decay_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            engine.reset_player_diff(&player_id);
        })
    }

    /// Dispatch an asynchronous write of the full session snapshot.
    ///
    /// In-memory state is the source of truth; a failed write is logged
    /// and never surfaced to the caller of the mutation that queued it.
    fn schedule_save(&self) {
        let Some(store) = self.inner.store.clone() else {
            tracing::debug!("No session store, skipping save");
            return;
        };
        let session = {
            let state = self.inner.state.lock();
            GameSession {
                players: state.players.clone(),
                settings: state.settings.clone(),
            }
        };
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store.save_session(&session) {
                tracing::error!(error = %e, "Failed to save session");
            }
        });
    }
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}
