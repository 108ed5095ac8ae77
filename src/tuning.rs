//! Game balance and physics tuning
//!
//! Every simulation constant lives here so a run can be rebalanced from JSON
//! without recompiling. Missing fields fall back to `crate::consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Data-driven simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub forward_speed: f32,
    pub max_tick_delta: f32,
    pub substeps: u32,
    pub fatal_y: f32,

    // === Jumping ===
    pub initial_jump_force: f32,
    pub max_jump_force: f32,
    pub min_jump_hold_ms: f64,
    pub max_jump_hold_ms: f64,
    pub jump_force_increment: f32,

    // === Platform stream ===
    pub platform_pitch: f32,
    pub visible_count: usize,
    pub baseline_y: f32,
    pub platform_min_y: f32,
    pub platform_max_y: f32,
    pub max_y_step: f32,
    pub moving_probability: f64,
    pub moving_amplitude: f32,
    pub moving_frequency: f32,

    // === Extents & collision ===
    pub player_width: f32,
    pub player_height: f32,
    pub platform_width: f32,
    pub platform_height: f32,
    pub overlap_divisor: f32,
    pub collision_tolerance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            forward_speed: FORWARD_SPEED,
            max_tick_delta: MAX_TICK_DELTA,
            substeps: SUBSTEPS,
            fatal_y: FATAL_Y,

            initial_jump_force: INITIAL_JUMP_FORCE,
            max_jump_force: MAX_JUMP_FORCE,
            min_jump_hold_ms: MIN_JUMP_HOLD_MS,
            max_jump_hold_ms: MAX_JUMP_HOLD_MS,
            jump_force_increment: JUMP_FORCE_INCREMENT,

            platform_pitch: PLATFORM_PITCH,
            visible_count: VISIBLE_COUNT,
            baseline_y: BASELINE_Y,
            platform_min_y: PLATFORM_MIN_Y,
            platform_max_y: PLATFORM_MAX_Y,
            max_y_step: MAX_Y_STEP,
            moving_probability: MOVING_PROBABILITY,
            moving_amplitude: MOVING_AMPLITUDE,
            moving_frequency: MOVING_FREQUENCY,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            platform_width: PLATFORM_WIDTH,
            platform_height: PLATFORM_HEIGHT,
            overlap_divisor: OVERLAP_DIVISOR,
            collision_tolerance: COLLISION_TOLERANCE,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides; fields absent from the JSON keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.validated())
    }

    /// Clamp values that would break the simulation's invariants
    pub fn validated(mut self) -> Self {
        self.visible_count = self.visible_count.max(1);
        self.substeps = self.substeps.max(1);
        if self.platform_pitch <= 0.0 {
            self.platform_pitch = PLATFORM_PITCH;
        }
        if self.overlap_divisor <= 0.0 {
            self.overlap_divisor = OVERLAP_DIVISOR;
        }
        if self.min_jump_hold_ms > self.max_jump_hold_ms {
            std::mem::swap(&mut self.min_jump_hold_ms, &mut self.max_jump_hold_ms);
        }
        if self.platform_min_y > self.platform_max_y {
            std::mem::swap(&mut self.platform_min_y, &mut self.platform_max_y);
        }
        self.moving_probability = self.moving_probability.clamp(0.0, 1.0);
        self.forward_speed = self.forward_speed.max(0.0);
        self.max_tick_delta = self.max_tick_delta.max(0.0);
        self
    }

    /// Resting height of the player on the baseline platform at run start
    pub fn spawn_y(&self) -> f32 {
        crate::spawn_y(self.baseline_y, self.platform_height, self.player_height)
    }

    /// Load tuning from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning file {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No tuning at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "forward_speed": 0.1 }"#).unwrap();
        assert!((tuning.forward_speed - 0.1).abs() < f32::EPSILON);
        assert_eq!(tuning.visible_count, VISIBLE_COUNT);
        assert!((tuning.gravity - GRAVITY).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validation_repairs_bad_values() {
        let json = r#"{
            "visible_count": 0,
            "substeps": 0,
            "min_jump_hold_ms": 500.0,
            "max_jump_hold_ms": 50.0,
            "forward_speed": -0.2
        }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.visible_count, 1);
        assert_eq!(tuning.substeps, 1);
        assert!(tuning.min_jump_hold_ms <= tuning.max_jump_hold_ms);
        // The world never scrolls backwards
        assert_eq!(tuning.forward_speed, 0.0);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Tuning::from_json("not json").is_err());
    }

    #[test]
    fn test_spawn_height() {
        let tuning = Tuning::default();
        assert!((tuning.spawn_y() - 0.9).abs() < 1e-6);
    }
}
