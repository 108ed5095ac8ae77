//! Session controller
//!
//! Owns the simulation state and the progression ledger. Input and UI
//! collaborators talk to it only through the command methods below and read
//! back plain `Snapshot`s, either from the return value or by subscribing.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

use crate::persistence::KeyValueStore;
use crate::progression::{Ledger, Theme, UnlockOutcome};
use crate::sim::{GameState, JumpPhase, Platform, PlayerState, TickReport, jump, tick};
use crate::tuning::Tuning;

/// Millisecond time source for jump hold timing
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Real time: monotonic natively, `Date.now()` in the browser
#[derive(Debug, Clone)]
pub struct SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Hand-driven clock for tests and replays. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Read-only view published to renderers and UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub active: bool,
    pub score: u64,
    pub high_score: u64,
    pub runs: u64,
    pub player: PlayerState,
    pub jump_phase: JumpPhase,
    pub world_position: f32,
    pub sim_time: f32,
    pub platforms: Vec<Platform>,
    pub gems: u64,
    pub gem_streak: u32,
    pub unlocked_themes: Vec<Theme>,
    pub current_theme: Theme,
    /// Special items collected for the current theme
    pub special_items: Vec<String>,
}

/// Handle returned by `Session::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Snapshot)>;

/// Top-level game session
pub struct Session {
    tuning: Tuning,
    state: GameState,
    ledger: Ledger,
    clock: Box<dyn Clock>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    last_report: TickReport,
}

impl Session {
    pub fn new(
        tuning: Tuning,
        seed: u64,
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let tuning = tuning.validated();
        Self {
            state: GameState::new(seed, &tuning),
            ledger: Ledger::new(store),
            tuning,
            clock,
            subscribers: Vec::new(),
            next_subscription: 1,
            last_report: TickReport::default(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Outcome of the most recent tick
    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    pub fn snapshot(&self) -> Snapshot {
        let progress = self.ledger.state();
        let current = progress.current_theme;
        Snapshot {
            active: self.state.run.active,
            score: self.state.run.score,
            high_score: self.state.run.high_score,
            runs: self.state.run.runs,
            player: self.state.player.clone(),
            jump_phase: JumpPhase::of(&self.state.player),
            world_position: self.state.world_position,
            sim_time: self.state.sim_time,
            platforms: self.state.platforms.clone(),
            gems: progress.gems,
            gem_streak: progress.gem_streak,
            unlocked_themes: progress.unlocked.clone(),
            current_theme: current,
            special_items: progress
                .special_items
                .get(&current)
                .map(|items| items.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Register a callback invoked with every published snapshot
    pub fn subscribe(&mut self, callback: impl FnMut(&Snapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn publish(&mut self) -> Snapshot {
        let snapshot = self.snapshot();
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&snapshot);
        }
        snapshot
    }

    // === Run lifecycle ===

    /// Reset transient state and start a new run
    pub fn start_run(&mut self) -> Snapshot {
        self.state.start_run(&self.tuning);
        self.ledger.reset_streak();
        self.last_report = TickReport::default();
        self.publish()
    }

    /// End the current run (high score = max of itself and the run's score)
    pub fn end_run(&mut self) -> Snapshot {
        if !self.state.run.active {
            return self.snapshot();
        }
        self.state.end_run();
        self.publish()
    }

    /// Advance one frame. No-op when no run is active.
    pub fn advance_tick(&mut self, dt: f32) -> Snapshot {
        if !self.state.run.active {
            return self.snapshot();
        }
        self.last_report = tick(&mut self.state, dt, &self.tuning);
        self.publish()
    }

    // === Jump input ===

    pub fn begin_jump_hold(&mut self) -> Snapshot {
        let now = self.clock.now_ms();
        self.begin_jump_hold_at(now)
    }

    pub fn end_jump_hold(&mut self) -> Snapshot {
        let now = self.clock.now_ms();
        self.end_jump_hold_at(now)
    }

    /// Press at an explicit timestamp (ms)
    pub fn begin_jump_hold_at(&mut self, now_ms: f64) -> Snapshot {
        let active = self.state.run.active;
        if jump::begin_hold(&mut self.state.player, active, now_ms, &self.tuning) {
            self.publish()
        } else {
            self.snapshot()
        }
    }

    /// Release at an explicit timestamp (ms)
    pub fn end_jump_hold_at(&mut self, now_ms: f64) -> Snapshot {
        match jump::end_hold(&mut self.state.player, now_ms, &self.tuning) {
            Some(force) => {
                log::debug!("Jump released with force {:.3}", force);
                self.publish()
            }
            None => self.snapshot(),
        }
    }

    // === Progression ===

    /// Read persisted progress; call once before other progression commands
    pub fn load_progress(&mut self) -> Snapshot {
        self.ledger.load();
        self.publish()
    }

    pub fn credit_gems(&mut self, amount: u64) -> Snapshot {
        self.ledger.credit_gems(amount);
        self.publish()
    }

    /// Regular gem pickup (streak bonus included)
    pub fn collect_gem(&mut self) -> Snapshot {
        self.ledger.collect_gem();
        self.publish()
    }

    pub fn award_perfect_jump(&mut self) -> Snapshot {
        self.ledger.award_perfect_jump();
        self.publish()
    }

    pub fn collect_special_item(&mut self, theme: Theme, item: &str) -> Snapshot {
        self.ledger.collect_special_item(theme, item);
        self.publish()
    }

    pub fn purchase_unlock(&mut self, theme: Theme) -> UnlockOutcome {
        let outcome = self.ledger.purchase_unlock(theme);
        if outcome == UnlockOutcome::Unlocked {
            self.publish();
        }
        outcome
    }

    /// Switch to an unlocked theme. Locked themes are refused.
    pub fn select_theme(&mut self, theme: Theme) -> bool {
        if !self.ledger.is_unlocked(theme) {
            log::debug!("Refusing locked theme {}", theme.as_str());
            return false;
        }
        self.ledger.select_theme(theme);
        self.publish();
        true
    }
}
