//! Game state and core simulation types
//!
//! Everything the physics tick mutates lives here. The session owns one
//! `GameState` and hands out read-only snapshots of it.

use std::collections::HashSet;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::platform::{Platform, initial_window};
use crate::tuning::Tuning;

/// The player object. Its x stays at the origin; the world scrolls beneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub pos: Vec3,
    pub vel: Vec3,
    /// Airborne (cleared on landing)
    pub jumping: bool,
    /// Jump input currently held
    pub jump_held: bool,
    /// Timestamp of the accepted press (milliseconds)
    pub jump_start_ms: f64,
}

impl PlayerState {
    /// Player at the spawn point, at rest
    pub fn spawn(tuning: &Tuning) -> Self {
        Self {
            pos: Vec3::new(0.0, tuning.spawn_y(), 0.0),
            vel: Vec3::ZERO,
            jumping: false,
            jump_held: false,
            jump_start_ms: 0.0,
        }
    }
}

/// Score bookkeeping for the current and past runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    /// Best score this process has seen
    pub high_score: u64,
    pub active: bool,
    /// Runs started so far
    pub runs: u64,
}

impl RunState {
    /// Begin a run: score resets, high score is untouched
    pub fn start(&mut self) {
        self.score = 0;
        self.active = true;
        self.runs += 1;
    }

    /// End the run and fold its score into the high score
    pub fn end(&mut self) {
        self.active = false;
        self.high_score = self.high_score.max(self.score);
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed; each run derives its own stream from it
    pub seed: u64,
    /// Platform stream RNG for the current run
    pub rng: Pcg32,
    pub player: PlayerState,
    /// Scroll offset of the world under the player
    pub world_position: f32,
    /// Accumulated simulation time (seconds of consumed, capped deltas)
    pub sim_time: f32,
    /// Resident platforms, ordered by index
    pub platforms: Vec<Platform>,
    /// Platform ids already credited this run
    pub scored: HashSet<u64>,
    pub run: RunState,
}

impl GameState {
    /// Fresh, inactive state with the first window already laid out
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(run_seed(seed, 0));
        let platforms = initial_window(&mut rng, tuning);
        Self {
            seed,
            rng,
            player: PlayerState::spawn(tuning),
            world_position: 0.0,
            sim_time: 0.0,
            platforms,
            scored: HashSet::new(),
            run: RunState::default(),
        }
    }

    /// Reset transient state and activate a new run
    pub fn start_run(&mut self, tuning: &Tuning) {
        self.run.start();
        self.rng = Pcg32::seed_from_u64(run_seed(self.seed, self.run.runs));
        self.player = PlayerState::spawn(tuning);
        self.world_position = 0.0;
        self.sim_time = 0.0;
        self.platforms = initial_window(&mut self.rng, tuning);
        self.scored.clear();
        log::info!("Run {} started (seed {})", self.run.runs, self.seed);
    }

    /// Deactivate the run and update the high score
    pub fn end_run(&mut self) {
        if !self.run.active {
            return;
        }
        self.run.end();
        log::info!(
            "Run {} over: score {}, high score {}",
            self.run.runs,
            self.run.score,
            self.run.high_score
        );
    }

    /// Credit a platform once per run. Returns true if it was new.
    pub fn credit_platform(&mut self, platform_id: u64) -> bool {
        if self.scored.insert(platform_id) {
            self.run.score += 1;
            true
        } else {
            false
        }
    }
}

/// Per-run stream seed (mixes the run counter into the session seed)
pub fn run_seed(seed: u64, run: u64) -> u64 {
    run.wrapping_mul(2654435761).wrapping_add(seed)
}
