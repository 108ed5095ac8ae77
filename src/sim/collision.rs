//! Landing detection between the player and platform segments
//!
//! The player's horizontal coordinate in platform space is the world scroll
//! offset; only vertical motion is resolved here. Overlap tests are slightly
//! permissive (half-extents divided by 1.8 instead of 2) so near misses land.

use glam::Vec3;

use super::platform::{Platform, PlatformKind};
use crate::tuning::Tuning;

/// Result of a landing check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Platform that was landed on
    pub platform_id: u64,
    /// Player y resting exactly on the platform top
    pub corrected_y: f32,
}

/// Effective platform position at the given simulation time
///
/// Moving platforms bob sinusoidally; everything else is static.
pub fn effective_position(platform: &Platform, sim_time: f32, tuning: &Tuning) -> Vec3 {
    let mut pos = platform.pos;
    if platform.kind == PlatformKind::Moving {
        pos.y += (sim_time * tuning.moving_frequency).sin() * tuning.moving_amplitude;
    }
    pos
}

/// Broad-phase box overlap between player and platform centres
pub fn overlaps(player: Vec3, platform: Vec3, tuning: &Tuning) -> bool {
    let horizontal = (player.x - platform.x).abs()
        < (tuning.player_width + tuning.platform_width) / tuning.overlap_divisor;
    let vertical = (player.y - platform.y).abs()
        < (tuning.player_height + tuning.platform_height) / tuning.overlap_divisor;
    horizontal && vertical
}

/// Check whether a descending player lands on a platform
///
/// `player` is the candidate position after this substep's displacement
/// (x = world scroll offset). Only descending motion can land.
pub fn resolve_landing(
    player: Vec3,
    velocity_y: f32,
    platform: &Platform,
    sim_time: f32,
    tuning: &Tuning,
) -> Option<Landing> {
    let platform_pos = effective_position(platform, sim_time, tuning);

    if !overlaps(player, platform_pos, tuning) || velocity_y >= 0.0 {
        return None;
    }

    let player_bottom = player.y - tuning.player_height / 2.0;
    let platform_top = platform_pos.y + tuning.platform_height / 2.0;

    if (player_bottom - platform_top).abs() < tuning.collision_tolerance {
        Some(Landing {
            platform_id: platform.id,
            corrected_y: platform_top + tuning.player_height / 2.0,
        })
    } else {
        None
    }
}

/// First landing across the window, in window order
pub fn first_landing(
    player: Vec3,
    velocity_y: f32,
    platforms: &[Platform],
    sim_time: f32,
    tuning: &Tuning,
) -> Option<Landing> {
    platforms
        .iter()
        .find_map(|p| resolve_landing(player, velocity_y, p, sim_time, tuning))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(id: u64, x: f32, y: f32, kind: PlatformKind) -> Platform {
        Platform {
            id,
            pos: Vec3::new(x, y, 0.0),
            kind,
        }
    }

    #[test]
    fn test_descending_onto_platform_lands() {
        let tuning = Tuning::default();
        let p = platform(3, 12.0, 0.2, PlatformKind::Normal);
        // Platform top at 0.45, feet at 0.5
        let player = Vec3::new(12.3, 0.9, 0.0);

        let landing = resolve_landing(player, -0.05, &p, 0.0, &tuning).unwrap();
        assert_eq!(landing.platform_id, 3);
        assert!((landing.corrected_y - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_ascending_never_lands() {
        let tuning = Tuning::default();
        let p = platform(0, 0.0, 0.0, PlatformKind::Normal);
        let player = Vec3::new(0.0, 0.7, 0.0);
        assert!(resolve_landing(player, 0.1, &p, 0.0, &tuning).is_none());
        assert!(resolve_landing(player, 0.0, &p, 0.0, &tuning).is_none());
    }

    #[test]
    fn test_horizontal_miss() {
        let tuning = Tuning::default();
        let p = platform(0, 0.0, 0.0, PlatformKind::Normal);
        // (0.8 + 2.0) / 1.8 = 1.555...
        let player = Vec3::new(1.6, 0.6, 0.0);
        assert!(resolve_landing(player, -0.1, &p, 0.0, &tuning).is_none());
        let player = Vec3::new(1.5, 0.6, 0.0);
        assert!(resolve_landing(player, -0.1, &p, 0.0, &tuning).is_some());
    }

    #[test]
    fn test_overlap_but_outside_tolerance() {
        let tuning = Tuning::default();
        let p = platform(0, 0.0, 0.0, PlatformKind::Normal);
        // Feet 0.25 below the top: still within tolerance
        let player = Vec3::new(0.0, 0.4, 0.0);
        assert!(resolve_landing(player, -0.1, &p, 0.0, &tuning).is_some());
        // Overlapping but feet 0.35 below the top
        let player = Vec3::new(0.0, 0.3, 0.0);
        assert!(overlaps(player, p.pos, &tuning));
        assert!(resolve_landing(player, -0.1, &p, 0.0, &tuning).is_none());
        // Feet well below the top
        let player = Vec3::new(0.0, -0.3, 0.0);
        assert!(resolve_landing(player, -0.1, &p, 0.0, &tuning).is_none());
    }

    #[test]
    fn test_moving_platform_offset_follows_sim_time() {
        let tuning = Tuning::default();
        let p = platform(1, 4.0, 0.0, PlatformKind::Moving);
        let quarter_period = std::f32::consts::FRAC_PI_2 / tuning.moving_frequency;

        let at_rest = effective_position(&p, 0.0, &tuning);
        assert!(at_rest.y.abs() < 1e-6);
        let at_peak = effective_position(&p, quarter_period, &tuning);
        assert!((at_peak.y - tuning.moving_amplitude).abs() < 1e-5);

        // Same time, same answer
        assert_eq!(
            effective_position(&p, 1.234, &tuning),
            effective_position(&p, 1.234, &tuning)
        );
    }

    #[test]
    fn test_moving_platform_landing_uses_offset() {
        let tuning = Tuning::default();
        let p = platform(1, 0.0, 0.0, PlatformKind::Moving);
        let quarter_period = std::f32::consts::FRAC_PI_2 / tuning.moving_frequency;

        let landing = resolve_landing(Vec3::new(0.0, 0.9, 0.0), -0.1, &p, quarter_period, &tuning)
            .unwrap();
        assert!((landing.corrected_y - (0.3 + 0.25 + 0.4)).abs() < 1e-5);
    }

    #[test]
    fn test_first_landing_in_window_order() {
        let tuning = Tuning::default();
        let platforms = [
            platform(7, 0.0, 0.0, PlatformKind::Normal),
            platform(8, 0.5, 0.0, PlatformKind::Normal),
        ];
        let landing = first_landing(Vec3::new(0.2, 0.6, 0.0), -0.1, &platforms, 0.0, &tuning);
        assert_eq!(landing.map(|l| l.platform_id), Some(7));
    }
}
