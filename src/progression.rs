//! Gem currency, theme unlocks and special items
//!
//! Persisted to a key/value store under two keys: the gem balance and the
//! ordered list of unlocked theme ids. Every change to either is written
//! through immediately; a failed write is logged and the in-memory change kept.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::KeyValueStore;

/// Storage key for the gem balance
pub const GEMS_KEY: &str = "gems";
/// Storage key for the unlocked theme list
pub const UNLOCKED_THEMES_KEY: &str = "unlockedThemes";

/// Cosmetic theme packs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Free starter theme
    #[default]
    Candy,
    Prehistoric,
    Underwater,
    Space,
    Jungle,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Candy,
        Theme::Prehistoric,
        Theme::Underwater,
        Theme::Space,
        Theme::Jungle,
    ];

    pub const STARTER: Theme = Theme::Candy;

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Candy => "candy",
            Theme::Prehistoric => "prehistoric",
            Theme::Underwater => "underwater",
            Theme::Space => "space",
            Theme::Jungle => "jungle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "candy" => Some(Theme::Candy),
            "prehistoric" => Some(Theme::Prehistoric),
            "underwater" => Some(Theme::Underwater),
            "space" => Some(Theme::Space),
            "jungle" => Some(Theme::Jungle),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::Candy => "Candy Land",
            Theme::Prehistoric => "Prehistoric",
            Theme::Underwater => "Underwater",
            Theme::Space => "Space",
            Theme::Jungle => "Jungle",
        }
    }

    /// Unlock price in gems
    pub fn price(&self) -> u64 {
        match self {
            Theme::Candy => 0,
            Theme::Prehistoric => 100,
            Theme::Underwater => 150,
            Theme::Space => 200,
            Theme::Jungle => 250,
        }
    }

    /// The theme's special collectible (worth `SPECIAL_ITEM_VALUE`)
    pub fn special_item(&self) -> &'static str {
        match self {
            Theme::Candy => "candy",
            Theme::Prehistoric => "egg",
            Theme::Underwater => "pearl",
            Theme::Space => "star",
            Theme::Jungle => "banana",
        }
    }
}

/// Result of an unlock attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum UnlockOutcome {
    Unlocked,
    AlreadyOwned,
    InsufficientGems { needed: u64 },
}

/// Progression data held in memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub gems: u64,
    /// Unlocked themes in unlock order; always contains the starter theme
    pub unlocked: Vec<Theme>,
    pub current_theme: Theme,
    /// Special items collected, per theme
    pub special_items: BTreeMap<Theme, BTreeSet<String>>,
    /// Consecutive gem pickups toward the streak bonus
    pub gem_streak: u32,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            gems: 0,
            unlocked: vec![Theme::STARTER],
            current_theme: Theme::STARTER,
            special_items: BTreeMap::new(),
            gem_streak: 0,
        }
    }
}

/// Decode a stored gem balance. Negative or non-numeric values read as 0.
pub fn decode_gems(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 0 => n as u64,
        Ok(n) => {
            log::warn!("Stored gem balance {} is negative, resetting to 0", n);
            0
        }
        Err(_) => {
            log::warn!("Stored gem balance {:?} is not a number, resetting to 0", raw);
            0
        }
    }
}

/// Decode a stored unlock list, keeping known ids once each, starter first if missing
pub fn decode_unlocked(raw: Option<&str>) -> Vec<Theme> {
    let ids: Vec<String> = match raw.map(serde_json::from_str::<Vec<String>>) {
        Some(Ok(ids)) => ids,
        Some(Err(e)) => {
            log::warn!("Stored theme list unreadable ({}), using defaults", e);
            Vec::new()
        }
        None => Vec::new(),
    };

    let mut unlocked = Vec::with_capacity(ids.len() + 1);
    if !ids.iter().any(|id| Theme::parse(id) == Some(Theme::STARTER)) {
        unlocked.push(Theme::STARTER);
    }
    for id in &ids {
        match Theme::parse(id) {
            Some(theme) if !unlocked.contains(&theme) => unlocked.push(theme),
            Some(_) => {}
            None => log::warn!("Ignoring unknown stored theme {:?}", id),
        }
    }
    unlocked
}

/// The progression ledger: currency, unlocks and persistence
pub struct Ledger {
    state: ProgressionState,
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").field("state", &self.state).finish()
    }
}

impl Ledger {
    /// Ledger with default progress; call `load` to read the store
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            state: ProgressionState::default(),
            store,
        }
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn gems(&self) -> u64 {
        self.state.gems
    }

    /// Read persisted gems and unlocks, validating what comes back
    pub fn load(&mut self) {
        self.state.gems = decode_gems(self.store.get(GEMS_KEY).as_deref());
        self.state.unlocked = decode_unlocked(self.store.get(UNLOCKED_THEMES_KEY).as_deref());
        if !self.is_unlocked(self.state.current_theme) {
            self.state.current_theme = Theme::STARTER;
        }
        log::info!(
            "Progress loaded: {} gems, {} theme(s) unlocked",
            self.state.gems,
            self.state.unlocked.len()
        );
    }

    fn persist_gems(&mut self) {
        let value = self.state.gems.to_string();
        if let Err(e) = self.store.set(GEMS_KEY, &value) {
            log::warn!("Failed to persist gems: {}", e);
        }
    }

    fn persist_unlocked(&mut self) {
        let ids: Vec<&str> = self.state.unlocked.iter().map(Theme::as_str).collect();
        let json = match serde_json::to_string(&ids) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to encode unlocked themes: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(UNLOCKED_THEMES_KEY, &json) {
            log::warn!("Failed to persist unlocked themes: {}", e);
        }
    }

    /// Add gems. Zero is a no-op.
    pub fn credit_gems(&mut self, amount: u64) -> u64 {
        if amount > 0 {
            self.state.gems = self.state.gems.saturating_add(amount);
            self.persist_gems();
        }
        self.state.gems
    }

    /// Regular gem pickup; every `STREAK_LENGTH` in a row adds the streak bonus.
    /// Returns the gems credited.
    pub fn collect_gem(&mut self) -> u64 {
        self.state.gem_streak += 1;
        let mut credited = GEM_PICKUP_VALUE;
        if self.state.gem_streak >= STREAK_LENGTH {
            self.state.gem_streak = 0;
            credited += STREAK_BONUS;
        }
        self.credit_gems(credited);
        credited
    }

    /// Clean landing bonus
    pub fn award_perfect_jump(&mut self) -> u64 {
        self.credit_gems(PERFECT_JUMP_BONUS)
    }

    pub fn reset_streak(&mut self) {
        self.state.gem_streak = 0;
    }

    /// Credit a special item and mark it collected for `theme`.
    /// Collecting the same item again credits again.
    pub fn collect_special_item(&mut self, theme: Theme, item: &str) -> u64 {
        self.state
            .special_items
            .entry(theme)
            .or_default()
            .insert(item.to_string());
        self.credit_gems(SPECIAL_ITEM_VALUE)
    }

    pub fn has_special_item(&self, theme: Theme, item: &str) -> bool {
        self.state
            .special_items
            .get(&theme)
            .is_some_and(|items| items.contains(item))
    }

    pub fn is_unlocked(&self, theme: Theme) -> bool {
        self.state.unlocked.contains(&theme)
    }

    /// Buy a theme. State is unchanged unless the outcome is `Unlocked`.
    pub fn purchase_unlock(&mut self, theme: Theme) -> UnlockOutcome {
        if self.is_unlocked(theme) {
            return UnlockOutcome::AlreadyOwned;
        }
        let price = theme.price();
        if self.state.gems < price {
            return UnlockOutcome::InsufficientGems {
                needed: price - self.state.gems,
            };
        }

        self.state.gems -= price;
        self.state.unlocked.push(theme);
        self.persist_gems();
        self.persist_unlocked();
        log::info!("Unlocked theme {} for {} gems", theme.as_str(), price);
        UnlockOutcome::Unlocked
    }

    /// Switch theme. Lock policy is the caller's business.
    pub fn select_theme(&mut self, theme: Theme) {
        self.state.current_theme = theme;
    }

    /// Percent of the way to affording `theme` (100 once affordable or owned)
    pub fn unlock_progress(&self, theme: Theme) -> f32 {
        let price = theme.price();
        if price == 0 || self.is_unlocked(theme) {
            return 100.0;
        }
        (self.state.gems as f32 / price as f32 * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, StorageError};

    fn ledger() -> (Ledger, MemoryStore) {
        let store = MemoryStore::new();
        let mut ledger = Ledger::new(Box::new(store.clone()));
        ledger.load();
        (ledger, store)
    }

    #[test]
    fn test_defaults_without_stored_progress() {
        let (ledger, _) = ledger();
        assert_eq!(ledger.gems(), 0);
        assert_eq!(ledger.state().unlocked, vec![Theme::Candy]);
        assert_eq!(ledger.state().current_theme, Theme::Candy);
    }

    #[test]
    fn test_purchase_rejected_when_short() {
        let (mut ledger, store) = ledger();
        for _ in 0..12 {
            ledger.credit_gems(1);
        }
        let outcome = ledger.purchase_unlock(Theme::Prehistoric);
        assert_eq!(outcome, UnlockOutcome::InsufficientGems { needed: 88 });
        assert_eq!(ledger.gems(), 12);
        assert!(!ledger.is_unlocked(Theme::Prehistoric));
        assert!(store.get(UNLOCKED_THEMES_KEY).is_none());
    }

    #[test]
    fn test_purchase_accepted_and_persisted() {
        let (mut ledger, store) = ledger();
        ledger.credit_gems(100);
        assert_eq!(ledger.purchase_unlock(Theme::Prehistoric), UnlockOutcome::Unlocked);
        assert_eq!(ledger.gems(), 0);
        assert!(ledger.is_unlocked(Theme::Prehistoric));

        assert_eq!(store.get(GEMS_KEY).as_deref(), Some("0"));
        assert_eq!(
            store.get(UNLOCKED_THEMES_KEY).as_deref(),
            Some(r#"["candy","prehistoric"]"#)
        );
    }

    #[test]
    fn test_repurchase_is_noop() {
        let (mut ledger, _) = ledger();
        ledger.credit_gems(300);
        ledger.purchase_unlock(Theme::Underwater);
        assert_eq!(ledger.gems(), 150);
        assert_eq!(ledger.purchase_unlock(Theme::Underwater), UnlockOutcome::AlreadyOwned);
        assert_eq!(ledger.gems(), 150);
        assert_eq!(ledger.state().unlocked.len(), 2);
        assert_eq!(ledger.purchase_unlock(Theme::Candy), UnlockOutcome::AlreadyOwned);
    }

    #[test]
    fn test_progress_survives_reload() {
        let (mut ledger, store) = ledger();
        ledger.credit_gems(260);
        ledger.purchase_unlock(Theme::Jungle);

        let mut reloaded = Ledger::new(Box::new(store.clone()));
        reloaded.load();
        assert_eq!(reloaded.gems(), 10);
        assert_eq!(reloaded.state().unlocked, vec![Theme::Candy, Theme::Jungle]);
    }

    #[test]
    fn test_streak_bonus_every_third_pickup() {
        let (mut ledger, _) = ledger();
        assert_eq!(ledger.collect_gem(), 1);
        assert_eq!(ledger.collect_gem(), 1);
        assert_eq!(ledger.collect_gem(), 1 + STREAK_BONUS);
        assert_eq!(ledger.gems(), 3 + STREAK_BONUS);
        assert_eq!(ledger.state().gem_streak, 0);

        ledger.collect_gem();
        ledger.reset_streak();
        ledger.collect_gem();
        ledger.collect_gem();
        assert_eq!(ledger.gems(), 3 + STREAK_BONUS + 3);
    }

    #[test]
    fn test_special_items_credit_every_time() {
        let (mut ledger, _) = ledger();
        ledger.collect_special_item(Theme::Prehistoric, "egg");
        ledger.collect_special_item(Theme::Prehistoric, "egg");
        assert_eq!(ledger.gems(), 2 * SPECIAL_ITEM_VALUE);
        assert!(ledger.has_special_item(Theme::Prehistoric, "egg"));
        assert!(!ledger.has_special_item(Theme::Space, "star"));
        assert_eq!(ledger.state().special_items[&Theme::Prehistoric].len(), 1);
    }

    #[test]
    fn test_perfect_jump_and_zero_credit() {
        let (mut ledger, store) = ledger();
        ledger.credit_gems(0);
        assert!(store.get(GEMS_KEY).is_none());
        assert_eq!(ledger.award_perfect_jump(), PERFECT_JUMP_BONUS);
        assert_eq!(store.get(GEMS_KEY).as_deref(), Some("3"));
    }

    #[test]
    fn test_unlock_progress() {
        let (mut ledger, _) = ledger();
        assert_eq!(ledger.unlock_progress(Theme::Candy), 100.0);
        ledger.credit_gems(50);
        assert!((ledger.unlock_progress(Theme::Prehistoric) - 50.0).abs() < 1e-4);
        assert!((ledger.unlock_progress(Theme::Jungle) - 20.0).abs() < 1e-4);
        ledger.credit_gems(500);
        assert_eq!(ledger.unlock_progress(Theme::Space), 100.0);
    }

    #[test]
    fn test_decode_gems_validates() {
        assert_eq!(decode_gems(None), 0);
        assert_eq!(decode_gems(Some("17")), 17);
        assert_eq!(decode_gems(Some("-5")), 0);
        assert_eq!(decode_gems(Some("lots")), 0);
    }

    #[test]
    fn test_decode_unlocked_validates() {
        assert_eq!(decode_unlocked(None), vec![Theme::Candy]);
        assert_eq!(decode_unlocked(Some("garbage")), vec![Theme::Candy]);
        assert_eq!(
            decode_unlocked(Some(r#"["space","volcano","space","candy"]"#)),
            vec![Theme::Space, Theme::Candy]
        );
        assert_eq!(
            decode_unlocked(Some(r#"["jungle"]"#)),
            vec![Theme::Candy, Theme::Jungle]
        );
    }

    #[test]
    fn test_corrupt_store_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(GEMS_KEY, "-40").unwrap();
        store.set(UNLOCKED_THEMES_KEY, "{").unwrap();
        let mut ledger = Ledger::new(Box::new(store));
        ledger.load();
        assert_eq!(ledger.state(), &ProgressionState::default());
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".into()))
        }
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut ledger = Ledger::new(Box::new(FailingStore));
        ledger.load();
        ledger.credit_gems(120);
        assert_eq!(ledger.purchase_unlock(Theme::Prehistoric), UnlockOutcome::Unlocked);
        assert_eq!(ledger.gems(), 20);
    }

    #[test]
    fn test_theme_ids_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::parse(theme.as_str()), Some(theme));
        }
        assert_eq!(Theme::parse("volcano"), None);
        assert_eq!(Theme::Candy.display_name(), "Candy Land");
        assert_eq!(Theme::Prehistoric.special_item(), "egg");
        assert_eq!(Theme::STARTER.price(), 0);
    }
}
