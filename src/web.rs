//! Browser bindings
//!
//! Exposes the session command surface to a JS renderer. Snapshots cross the
//! boundary as JSON strings; the renderer polls one per frame.

use wasm_bindgen::prelude::*;

use crate::persistence::LocalStore;
use crate::progression::Theme;
use crate::session::{Session, Snapshot, SystemClock};
use crate::tuning::Tuning;

fn to_json(snapshot: &Snapshot) -> String {
    serde_json::to_string(snapshot).unwrap_or_else(|e| {
        log::warn!("Snapshot encode failed: {}", e);
        String::from("{}")
    })
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Block Runner (web) starting...");
}

/// JS-facing handle around a `Session` persisted to LocalStorage
#[wasm_bindgen]
pub struct WebRunner {
    session: Session,
}

#[wasm_bindgen]
impl WebRunner {
    /// `tuning_json` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, tuning_json: &str) -> WebRunner {
        let tuning = if tuning_json.trim().is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning_json).unwrap_or_else(|e| {
                log::warn!("Invalid tuning JSON ({}), using defaults", e);
                Tuning::default()
            })
        };
        let session = Session::new(
            tuning,
            seed,
            Box::new(LocalStore::new()),
            Box::new(SystemClock::new()),
        );
        WebRunner { session }
    }

    pub fn load_progress(&mut self) -> String {
        to_json(&self.session.load_progress())
    }

    pub fn start_run(&mut self) -> String {
        to_json(&self.session.start_run())
    }

    pub fn begin_jump_hold(&mut self) -> String {
        to_json(&self.session.begin_jump_hold())
    }

    pub fn end_jump_hold(&mut self) -> String {
        to_json(&self.session.end_jump_hold())
    }

    pub fn advance_tick(&mut self, dt: f32) -> String {
        to_json(&self.session.advance_tick(dt))
    }

    pub fn collect_gem(&mut self) -> String {
        to_json(&self.session.collect_gem())
    }

    pub fn award_perfect_jump(&mut self) -> String {
        to_json(&self.session.award_perfect_jump())
    }

    pub fn credit_gems(&mut self, amount: u32) -> String {
        to_json(&self.session.credit_gems(amount as u64))
    }

    pub fn collect_special_item(&mut self, theme: &str, item: &str) -> String {
        if let Some(theme) = Theme::parse(theme) {
            self.session.collect_special_item(theme, item);
        } else {
            log::warn!("Unknown theme {:?}", theme);
        }
        to_json(&self.session.snapshot())
    }

    /// Returns the unlock outcome as JSON
    pub fn purchase_unlock(&mut self, theme: &str) -> String {
        match Theme::parse(theme) {
            Some(theme) => serde_json::to_string(&self.session.purchase_unlock(theme))
                .unwrap_or_else(|_| String::from("{}")),
            None => String::from(r#"{"outcome":"unknown_theme"}"#),
        }
    }

    pub fn select_theme(&mut self, theme: &str) -> bool {
        Theme::parse(theme).is_some_and(|theme| self.session.select_theme(theme))
    }

    pub fn snapshot(&self) -> String {
        to_json(&self.session.snapshot())
    }
}
