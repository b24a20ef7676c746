//! In-memory settings backend.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{SettingsError, SettingsResult};
use crate::store::{SettingValue, SettingsStore};

/// Settings kept in memory only; lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySettings {
    data: RwLock<BTreeMap<String, SettingValue>>,
}

impl MemorySettings {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries(entries: impl IntoIterator<Item = (String, SettingValue)>) -> Self {
        Self {
            data: RwLock::new(entries.into_iter().collect()),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn name(&self) -> &str {
        "memory"
    }

    fn get_value(&self, key: &str) -> SettingsResult<Option<SettingValue>> {
        let guard = self.data.read().map_err(|_| SettingsError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set_value(&self, key: &str, value: SettingValue) -> SettingsResult<()> {
        let mut guard = self.data.write().map_err(|_| SettingsError::Poisoned)?;
        guard.insert(key.to_string(), value);
        Ok(())
    }

    fn set_values(&self, values: &[(&str, SettingValue)]) -> SettingsResult<()> {
        let mut guard = self.data.write().map_err(|_| SettingsError::Poisoned)?;
        for (key, value) in values {
            guard.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> SettingsResult<()> {
        let mut guard = self.data.write().map_err(|_| SettingsError::Poisoned)?;
        guard.remove(key);
        Ok(())
    }

    fn entries(&self) -> SettingsResult<Vec<(String, SettingValue)>> {
        let guard = self.data.read().map_err(|_| SettingsError::Poisoned)?;
        Ok(guard.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
