//! JSON file settings backend.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{SettingsError, SettingsResult};
use crate::store::{SettingValue, SettingsStore};

/// Settings persisted to a flat JSON object on disk.
///
/// The file is read once on [`open`](Self::open) and rewritten after every
/// change. Writes go to `<path>.tmp` first and are renamed into place, so
/// a crash mid-write never leaves a truncated file behind.
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, SettingValue>>,
}

impl JsonFileSettings {
    /// Open the settings file at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let cache = match fs::read_to_string(&path) {
            Ok(json) if json.trim().is_empty() => BTreeMap::new(),
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file yet");
                BTreeMap::new()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn io_err(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Apply `change` to a copy of the settings, write the copy, and only
    /// then replace the cache. `change` returns whether anything changed.
    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, SettingValue>) -> bool,
    ) -> SettingsResult<()> {
        let mut guard = self.cache.write().map_err(|_| SettingsError::Poisoned)?;
        let mut next = guard.clone();
        if !change(&mut next) {
            return Ok(());
        }
        self.flush(&next)?;
        *guard = next;
        Ok(())
    }

    fn flush(&self, data: &BTreeMap<String, SettingValue>) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp).map_err(|e| self.io_err(e))?;
            file.write_all(json.as_bytes()).map_err(|e| self.io_err(e))?;
            file.sync_all().map_err(|e| self.io_err(e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        tracing::trace!(path = %self.path.display(), entries = data.len(), "settings saved");
        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn name(&self) -> &str {
        "json-file"
    }

    fn get_value(&self, key: &str) -> SettingsResult<Option<SettingValue>> {
        let guard = self.cache.read().map_err(|_| SettingsError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set_value(&self, key: &str, value: SettingValue) -> SettingsResult<()> {
        self.update(|data| {
            data.insert(key.to_string(), value);
            true
        })
    }

    fn set_values(&self, values: &[(&str, SettingValue)]) -> SettingsResult<()> {
        self.update(|data| {
            for (key, value) in values {
                data.insert((*key).to_string(), value.clone());
            }
            !values.is_empty()
        })
    }

    fn remove(&self, key: &str) -> SettingsResult<()> {
        self.update(|data| data.remove(key).is_some())
    }

    fn entries(&self) -> SettingsResult<Vec<(String, SettingValue)>> {
        let guard = self.cache.read().map_err(|_| SettingsError::Poisoned)?;
        Ok(guard.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileSettings::open(dir.path().join("settings.json")).unwrap();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let store = JsonFileSettings::open(&path).unwrap();
        store.set_bool("has_rated", false).unwrap();
        store.set_int("last_rating_prompt", 1_000).unwrap();
        store.set_string("user_name", "Mira").unwrap();
        drop(store);

        let store = JsonFileSettings::open(&path).unwrap();
        assert_eq!(store.get_bool("has_rated").unwrap(), Some(false));
        assert_eq!(store.get_int("last_rating_prompt").unwrap(), Some(1_000));
        assert_eq!(store.get_string("user_name").unwrap().as_deref(), Some("Mira"));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn file_is_flat_json_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = JsonFileSettings::open(&path).unwrap();
        store.set_bool("has_rated", true).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "has_rated": true }));
    }

    #[test]
    fn corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileSettings::open(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn failed_write_keeps_previous_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = JsonFileSettings::open(&path).unwrap();
        store.set_bool("has_rated", false).unwrap();
        store.set_int("last_rating_prompt", 10).unwrap();

        // A directory in the way of the temp file makes every write fail.
        fs::create_dir(store.temp_path()).unwrap();
        assert!(matches!(
            store.set_bool("has_rated", true),
            Err(SettingsError::Io { .. })
        ));
        assert!(
            store
                .set_values(&[
                    ("has_rated", SettingValue::Bool(true)),
                    ("last_rating_prompt", SettingValue::Int(99)),
                ])
                .is_err()
        );
        assert!(store.remove("last_rating_prompt").is_err());

        assert_eq!(store.get_bool("has_rated").unwrap(), Some(false));
        assert_eq!(store.get_int("last_rating_prompt").unwrap(), Some(10));

        fs::remove_dir(store.temp_path()).unwrap();
        drop(store);
        let store = JsonFileSettings::open(&path).unwrap();
        assert_eq!(store.get_bool("has_rated").unwrap(), Some(false));
        assert_eq!(store.get_int("last_rating_prompt").unwrap(), Some(10));
    }

    #[test]
    fn set_values_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = JsonFileSettings::open(&path).unwrap();
        store
            .set_values(&[
                ("has_rated", SettingValue::Bool(true)),
                ("last_rating_prompt", SettingValue::Int(5)),
            ])
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({ "has_rated": true, "last_rating_prompt": 5 })
        );
    }

    #[test]
    fn remove_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = JsonFileSettings::open(&path).unwrap();
        store.set_string("user_name", "Mira").unwrap();
        store.remove("user_name").unwrap();
        drop(store);

        let store = JsonFileSettings::open(&path).unwrap();
        assert_eq!(store.get_string("user_name").unwrap(), None);
    }
}
