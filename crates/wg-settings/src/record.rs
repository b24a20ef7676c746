//! Review prompt bookkeeping and the player's display name.

use serde::{Deserialize, Serialize};

use crate::error::SettingsResult;
use crate::keys::{DEFAULT_USER_NAME, HAS_RATED, LAST_RATING_PROMPT, USER_NAME};
use crate::store::{SettingValue, SettingsStore};

/// What the store remembers about rating prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPromptRecord {
    /// The player chose "Rate Now" at some point.
    pub has_rated: bool,
    /// Epoch milliseconds of the last prompt shown; 0 if never.
    pub last_prompt_at_millis: i64,
}

impl ReviewPromptRecord {
    /// Read the record, treating unset keys as their defaults.
    pub fn load(store: &dyn SettingsStore) -> SettingsResult<Self> {
        Ok(Self {
            has_rated: store.get_bool(HAS_RATED)?.unwrap_or(false),
            last_prompt_at_millis: store.get_int(LAST_RATING_PROMPT)?.unwrap_or(0),
        })
    }

    /// Write both fields back in a single change.
    pub fn save(&self, store: &dyn SettingsStore) -> SettingsResult<()> {
        store.set_values(&[
            (HAS_RATED, SettingValue::Bool(self.has_rated)),
            (LAST_RATING_PROMPT, SettingValue::Int(self.last_prompt_at_millis)),
        ])
    }

    /// Record that a prompt was shown at `now` and how the player answered.
    ///
    /// Declining only moves the timestamp; it never clears `has_rated`.
    pub fn after_prompt(self, now: i64, rated: bool) -> Self {
        Self {
            has_rated: self.has_rated || rated,
            last_prompt_at_millis: now,
        }
    }
}

/// The player's display name, or `"Adventurer"` if unset or blank.
pub fn user_display_name(store: &dyn SettingsStore) -> String {
    match store.get_string(USER_NAME) {
        Ok(Some(name)) if !name.trim().is_empty() => name,
        Ok(_) => DEFAULT_USER_NAME.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "cannot read user name, using default");
            DEFAULT_USER_NAME.to_string()
        }
    }
}

/// Store the player's display name.
pub fn set_user_name(store: &dyn SettingsStore, name: &str) -> SettingsResult<()> {
    store.set_string(USER_NAME, name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySettings;

    #[test]
    fn empty_store_gives_default_record() {
        let store = MemorySettings::new();
        let record = ReviewPromptRecord::load(&store).unwrap();
        assert_eq!(record, ReviewPromptRecord::default());
    }

    #[test]
    fn save_and_load() {
        let store = MemorySettings::new();
        let record = ReviewPromptRecord {
            has_rated: true,
            last_prompt_at_millis: 123,
        };
        record.save(&store).unwrap();
        assert_eq!(ReviewPromptRecord::load(&store).unwrap(), record);
        assert_eq!(store.get_int(LAST_RATING_PROMPT).unwrap(), Some(123));
    }

    #[test]
    fn declining_keeps_has_rated() {
        let record = ReviewPromptRecord::default().after_prompt(50, false);
        assert!(!record.has_rated);
        assert_eq!(record.last_prompt_at_millis, 50);

        let rated = record.after_prompt(60, true).after_prompt(70, false);
        assert!(rated.has_rated);
        assert_eq!(rated.last_prompt_at_millis, 70);
    }

    #[test]
    fn display_name_defaults() {
        let store = MemorySettings::new();
        assert_eq!(user_display_name(&store), "Adventurer");

        set_user_name(&store, "  ").unwrap();
        assert_eq!(user_display_name(&store), "Adventurer");

        set_user_name(&store, " Mira ").unwrap();
        assert_eq!(user_display_name(&store), "Mira");
    }

    #[test]
    fn display_name_with_wrong_type_defaults() {
        let store = MemorySettings::new();
        store.set_int(USER_NAME, 7).unwrap();
        assert_eq!(user_display_name(&store), "Adventurer");
    }
}
