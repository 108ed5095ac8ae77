//! Procedural platform stream
//!
//! Platforms sit at a fixed x pitch from their generation index. Heights
//! random-walk from the previous platform, clamped into an absolute band so
//! the track never drifts away.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Platform variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    #[default]
    Normal,
    /// Bobs vertically with simulation time
    Moving,
    /// Reserved: never generated, collides like `Normal`
    Disappearing,
}

/// A platform segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Stable id, equal to the generation index
    pub id: u64,
    pub pos: Vec3,
    pub kind: PlatformKind,
}

impl Platform {
    /// Generation index (ids are indices)
    #[inline]
    pub fn index(&self) -> u64 {
        self.id
    }
}

/// Generate the platform at `index`, continuing from the previous platform's height
pub fn generate_platform(
    index: u64,
    previous_y: f32,
    rng: &mut Pcg32,
    tuning: &Tuning,
) -> Platform {
    let y = if index == 0 {
        tuning.baseline_y
    } else {
        let step = rng.random::<f32>() * tuning.max_y_step * 2.0 - tuning.max_y_step;
        (previous_y + step).clamp(tuning.platform_min_y, tuning.platform_max_y)
    };

    let kind = if index == 0 {
        PlatformKind::Normal
    } else if rng.random_bool(tuning.moving_probability) {
        PlatformKind::Moving
    } else {
        PlatformKind::Normal
    };

    Platform {
        id: index,
        pos: Vec3::new(index as f32 * tuning.platform_pitch, y, 0.0),
        kind,
    }
}

/// Generate the first `visible_count` platforms, starting from index 0
pub fn initial_window(rng: &mut Pcg32, tuning: &Tuning) -> Vec<Platform> {
    let mut platforms = Vec::with_capacity(tuning.visible_count);
    let mut last_y = tuning.baseline_y;
    for index in 0..tuning.visible_count as u64 {
        let platform = generate_platform(index, last_y, rng, tuning);
        last_y = platform.pos.y;
        platforms.push(platform);
    }
    platforms
}

/// Inclusive index range of platforms allowed to stay resident
pub fn window_bounds(world_position: f32, tuning: &Tuning) -> (i64, i64) {
    let current = (world_position / tuning.platform_pitch).floor() as i64;
    (
        current - crate::consts::TRAILING_PLATFORMS,
        current + tuning.visible_count as i64,
    )
}

/// Retire platforms outside the window and refill it to `visible_count`
///
/// Returns the number of platforms appended.
pub fn maintain_window(
    platforms: &mut Vec<Platform>,
    world_position: f32,
    rng: &mut Pcg32,
    tuning: &Tuning,
) -> usize {
    let (trailing, leading) = window_bounds(world_position, tuning);
    platforms.retain(|p| {
        let index = p.index() as i64;
        index >= trailing && index <= leading
    });

    let mut appended = 0;
    while platforms.len() < tuning.visible_count {
        let (next_index, last_y) = match platforms.last() {
            Some(last) => (last.index() + 1, last.pos.y),
            None => (0, tuning.baseline_y),
        };
        platforms.push(generate_platform(next_index, last_y, rng, tuning));
        appended += 1;
    }

    if appended > 0 {
        log::debug!(
            "Window refilled with {} platform(s), leading index {}",
            appended,
            platforms.last().map(|p| p.id).unwrap_or(0)
        );
    }
    appended
}
