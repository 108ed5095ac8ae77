//! Block Runner - A side-scrolling procedural platform runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (platforms, collisions, jumping, physics tick)
//! - `progression`: Gem currency, theme unlocks and special items
//! - `persistence`: Durable key/value storage backends
//! - `session`: Run lifecycle, command surface and published snapshots
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod progression;
pub mod session;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use progression::{Ledger, Theme, UnlockOutcome};
pub use session::{Clock, ManualClock, Session, Snapshot, SystemClock};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Gravity, expressed per reference 60 fps frame
    pub const GRAVITY: f32 = -0.012;
    /// Terminal fall speed (per tick)
    pub const MAX_FALL_SPEED: f32 = -0.5;
    /// World scroll per tick (independent of delta)
    pub const FORWARD_SPEED: f32 = 0.06;
    /// Largest delta a single tick will integrate (seconds)
    pub const MAX_TICK_DELTA: f32 = 1.0 / 30.0;
    /// Vertical integration substeps per tick
    pub const SUBSTEPS: u32 = 3;
    /// Reference frame rate that gravity is expressed against
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Below this y the run is over
    pub const FATAL_Y: f32 = -3.0;

    /// Jump impulses
    pub const INITIAL_JUMP_FORCE: f32 = 0.3;
    pub const MAX_JUMP_FORCE: f32 = 0.45;
    /// Hold duration bounds for the charged jump (milliseconds)
    pub const MIN_JUMP_HOLD_MS: f64 = 100.0;
    pub const MAX_JUMP_HOLD_MS: f64 = 400.0;
    /// Added to vertical velocity each tick while held and ascending
    pub const JUMP_FORCE_INCREMENT: f32 = 0.001;

    /// Platform stream
    pub const PLATFORM_PITCH: f32 = 4.0;
    pub const VISIBLE_COUNT: usize = 15;
    pub const BASELINE_Y: f32 = 0.0;
    pub const PLATFORM_MIN_Y: f32 = -0.5;
    pub const PLATFORM_MAX_Y: f32 = 0.8;
    /// Random y step between neighbours is drawn from [-MAX_Y_STEP, MAX_Y_STEP)
    pub const MAX_Y_STEP: f32 = 0.25;
    pub const MOVING_PROBABILITY: f64 = 0.15;
    /// Platforms kept behind the scroll position
    pub const TRAILING_PLATFORMS: i64 = 2;

    /// Moving platform bob (amplitude in world units, frequency in rad/s of sim time)
    pub const MOVING_AMPLITUDE: f32 = 0.3;
    pub const MOVING_FREQUENCY: f32 = 2.0;

    /// Extents
    pub const PLAYER_WIDTH: f32 = 0.8;
    pub const PLAYER_HEIGHT: f32 = 0.8;
    pub const PLATFORM_WIDTH: f32 = 2.0;
    pub const PLATFORM_HEIGHT: f32 = 0.5;

    /// Broad-phase divisor (1.8 rather than 2.0 gives a little forgiveness)
    pub const OVERLAP_DIVISOR: f32 = 1.8;
    /// Max gap between player feet and platform top that still counts as a landing
    pub const COLLISION_TOLERANCE: f32 = 0.3;

    /// Gem economy
    pub const GEM_PICKUP_VALUE: u64 = 1;
    pub const PERFECT_JUMP_BONUS: u64 = 3;
    pub const STREAK_BONUS: u64 = 5;
    pub const STREAK_LENGTH: u32 = 3;
    pub const SPECIAL_ITEM_VALUE: u64 = 10;
}

/// Spawn height: resting on the baseline platform
#[inline]
pub fn spawn_y(baseline_y: f32, platform_height: f32, player_height: f32) -> f32 {
    baseline_y + platform_height + player_height / 2.0
}
