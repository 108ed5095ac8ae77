//! Variable-delta simulation tick
//!
//! One tick per frame callback: scroll the world, integrate gravity in
//! substeps with landing resolution, end the run on a fatal fall, then keep
//! the platform window full and credit new landings.

use super::collision::first_landing;
use super::jump;
use super::platform::maintain_window;
use super::state::GameState;
use crate::tuning::Tuning;

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Platform the player rests on after this tick
    pub landed_on: Option<u64>,
    /// The landing credited a platform not scored before
    pub scored: bool,
    /// The player fell through and the run ended
    pub run_ended: bool,
    /// Platforms generated to refill the window
    pub platforms_spawned: usize,
}

/// Advance the game state by one frame delta (seconds)
///
/// No-op when no run is active.
pub fn tick(state: &mut GameState, dt: f32, tuning: &Tuning) -> TickReport {
    let mut report = TickReport::default();
    if !state.run.active {
        return report;
    }

    // Non-finite deltas from the host count as zero
    let dt = if dt.is_finite() {
        dt.clamp(0.0, tuning.max_tick_delta)
    } else {
        0.0
    };
    let was_rising = state.player.vel.y > 0.0;
    let sim_time = state.sim_time + dt;
    let world_position = state.world_position + tuning.forward_speed;

    let mut vel_y = (state.player.vel.y
        + tuning.gravity * dt * crate::consts::REFERENCE_FPS)
        .max(tuning.max_fall_speed);

    let mut pos = state.player.pos;
    let mut landed_on = None;
    let steps = tuning.substeps.max(1);

    for _ in 0..steps {
        let step_vel = vel_y / steps as f32;
        let mut candidate = pos;
        candidate.y += step_vel;

        // Horizontal collision coordinate is the scroll offset
        let mut probe = candidate;
        probe.x = world_position;

        if let Some(landing) = first_landing(probe, step_vel, &state.platforms, sim_time, tuning)
        {
            candidate.y = landing.corrected_y;
            vel_y = 0.0;
            landed_on = Some(landing.platform_id);
        }

        pos = candidate;
    }

    // Fatal fall: the run ends and nothing else from this tick is committed
    if pos.y < tuning.fatal_y {
        state.end_run();
        report.run_ended = true;
        return report;
    }

    state.sim_time = sim_time;
    state.world_position = world_position;

    report.platforms_spawned = maintain_window(
        &mut state.platforms,
        state.world_position,
        &mut state.rng,
        tuning,
    );

    if let Some(platform_id) = landed_on {
        report.scored = state.credit_platform(platform_id);
        if report.scored {
            log::debug!("Landed on platform {} (score {})", platform_id, state.run.score);
        }
    }

    state.player.pos = pos;
    state.player.vel.x = 0.0;
    state.player.vel.z = 0.0;
    state.player.vel.y = vel_y;
    jump::apply_charge(&mut state.player, was_rising, tuning);

    if landed_on.is_some() {
        jump::land(&mut state.player);
    } else {
        state.player.jumping = true;
    }

    report.landed_on = landed_on;
    report
}
