//! Deterministic simulation module
//!
//! All gameplay physics lives here. This module must be pure and deterministic:
//! - Periodic motion keyed off accumulated simulation time, never wall clock
//! - Seeded RNG only
//! - Stable iteration order (platforms by index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod jump;
pub mod platform;
pub mod state;
pub mod tick;

pub use collision::{Landing, effective_position, first_landing, overlaps, resolve_landing};
pub use jump::{JumpPhase, jump_force};
pub use platform::{Platform, PlatformKind, generate_platform, initial_window, maintain_window};
pub use state::{GameState, PlayerState, RunState};
pub use tick::{TickReport, tick};
