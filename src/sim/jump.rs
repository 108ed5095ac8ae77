//! Variable-height jump
//!
//! Tap for a short hop, hold for a higher jump. A press sets the initial
//! impulse; the release overwrites vertical velocity with a force interpolated
//! from the clamped hold duration. While held and still rising, each tick adds
//! a small charge increment.

use serde::{Deserialize, Serialize};

use super::state::PlayerState;
use crate::tuning::Tuning;

/// Observable jump state, derived from the player's flags and velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpPhase {
    Grounded,
    /// Held and ascending: charge increments apply
    RisingCharging,
    /// Released and ascending
    RisingReleased,
    Falling,
}

impl JumpPhase {
    pub fn of(player: &PlayerState) -> Self {
        if !player.jumping {
            JumpPhase::Grounded
        } else if player.vel.y > 0.0 && player.jump_held {
            JumpPhase::RisingCharging
        } else if player.vel.y > 0.0 {
            JumpPhase::RisingReleased
        } else {
            JumpPhase::Falling
        }
    }
}

/// Final jump force for a hold of `hold_ms`, clamped to the hold bounds
pub fn jump_force(hold_ms: f64, tuning: &Tuning) -> f32 {
    let clamped = hold_ms.clamp(tuning.min_jump_hold_ms, tuning.max_jump_hold_ms);
    let span = tuning.max_jump_hold_ms - tuning.min_jump_hold_ms;
    let t = if span > 0.0 {
        ((clamped - tuning.min_jump_hold_ms) / span) as f32
    } else {
        1.0
    };
    tuning.initial_jump_force + t * (tuning.max_jump_force - tuning.initial_jump_force)
}

/// Start a jump. Only accepted while grounded during an active run.
pub fn begin_hold(
    player: &mut PlayerState,
    run_active: bool,
    now_ms: f64,
    tuning: &Tuning,
) -> bool {
    if player.jumping || !run_active {
        return false;
    }
    player.vel.y = tuning.initial_jump_force;
    player.jumping = true;
    player.jump_held = true;
    player.jump_start_ms = now_ms;
    true
}

/// Release the jump button. Returns the applied force, or `None` if nothing was held.
pub fn end_hold(player: &mut PlayerState, now_ms: f64, tuning: &Tuning) -> Option<f32> {
    if !player.jump_held {
        return None;
    }
    let force = jump_force(now_ms - player.jump_start_ms, tuning);
    player.vel.y = force;
    player.jump_held = false;
    Some(force)
}

/// Per-tick charge while held and rising
///
/// `was_rising` is the vertical velocity sign at the start of the tick, before
/// gravity, so the tick on which the ascent turns over still charges.
pub fn apply_charge(player: &mut PlayerState, was_rising: bool, tuning: &Tuning) -> bool {
    if player.jump_held && was_rising {
        player.vel.y += tuning.jump_force_increment;
        true
    } else {
        false
    }
}

/// Touchdown: the next press is accepted again. A hold still in progress
/// stays active, so its release applies the charged force.
pub fn land(player: &mut PlayerState) {
    player.jumping = false;
}
