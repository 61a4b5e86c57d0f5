use crate::{
    contest::model::Platform,
    preferences::store::{PreferenceError, PreferenceStore},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};

pub const SELECTED_PLATFORMS_KEY: &str = "selectedPlatforms";
pub const SHOW_BOOKMARKED_KEY: &str = "showBookmarked";

/// What the user chose to see on the contest board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPreferences {
    pub selected_platforms: BTreeSet<Platform>,
    pub show_bookmarked: bool,
}

impl Default for FilterPreferences {
    fn default() -> Self {
        Self {
            selected_platforms: BTreeSet::from(Platform::ALL),
            show_bookmarked: false,
        }
    }
}

impl FilterPreferences {
    /// Reads both entries from `store`. Each one falls back to its default
    /// independently when missing or malformed.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();

        Self {
            selected_platforms: read_entry(store, SELECTED_PLATFORMS_KEY)
                .unwrap_or(defaults.selected_platforms),
            show_bookmarked: read_entry(store, SHOW_BOOKMARKED_KEY)
                .unwrap_or(defaults.show_bookmarked),
        }
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), PreferenceError> {
        store.set(
            SELECTED_PLATFORMS_KEY,
            serde_json::to_value(&self.selected_platforms)?,
        )?;
        store.set(
            SHOW_BOOKMARKED_KEY,
            serde_json::to_value(self.show_bookmarked)?,
        )?;
        Ok(())
    }

    pub fn toggle_platform(&mut self, platform: Platform) {
        if !self.selected_platforms.remove(&platform) {
            self.selected_platforms.insert(platform);
        }
    }

    /// Deselects every platform, which leaves nothing to show.
    pub fn clear_all(&mut self) {
        self.selected_platforms.clear();
    }

    pub fn select_all(&mut self) {
        self.selected_platforms = BTreeSet::from(Platform::ALL);
    }

    pub fn toggle_bookmarked(&mut self) {
        self.show_bookmarked = !self.show_bookmarked;
    }

    pub fn is_selected(&self, platform: Platform) -> bool {
        self.selected_platforms.contains(&platform)
    }
}

fn read_entry<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("stored preference `{}` is malformed, using default: {}", key, e);
            None
        }
    }
}

/// Filter preferences bound to the store they were loaded from.
///
/// Every mutation is written through immediately. A failed write is logged
/// and otherwise ignored; the in-memory value stays updated.
pub struct PersistedFilter {
    prefs: FilterPreferences,
    store: Arc<dyn PreferenceStore>,
}

impl PersistedFilter {
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let prefs = FilterPreferences::load(store.as_ref());
        tracing::debug!("filter preferences loaded: {:?}", prefs);
        Self { prefs, store }
    }

    pub fn preferences(&self) -> &FilterPreferences {
        &self.prefs
    }

    pub fn toggle_platform(&mut self, platform: Platform) {
        self.prefs.toggle_platform(platform);
        self.persist();
    }

    pub fn clear_all(&mut self) {
        self.prefs.clear_all();
        self.persist();
    }

    pub fn select_all(&mut self) {
        self.prefs.select_all();
        self.persist();
    }

    pub fn toggle_bookmarked(&mut self) {
        self.prefs.toggle_bookmarked();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.prefs.save(self.store.as_ref()) {
            tracing::warn!("failed to persist filter preferences: {:?}", e);
        }
    }
}
