//! The settings storage trait.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};

/// A single stored setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer (timestamps are epoch milliseconds).
    Int(i64),
    /// Free text.
    Text(String),
}

impl SettingValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Text(_) => "string",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Pluggable key/value settings storage.
///
/// Implementations must be thread-safe so a store can be shared between
/// the engine and the presentation layer. Backends only implement the
/// untyped accessors; typed getters and setters are provided.
pub trait SettingsStore: Send + Sync {
    /// Human-readable backend name for logging.
    fn name(&self) -> &str;

    /// Read a raw value. `Ok(None)` means the key is unset.
    fn get_value(&self, key: &str) -> SettingsResult<Option<SettingValue>>;

    /// Write a raw value, replacing any previous one.
    fn set_value(&self, key: &str, value: SettingValue) -> SettingsResult<()>;

    /// Write several values as one change. Either all of them are stored
    /// or, on error, none are.
    fn set_values(&self, values: &[(&str, SettingValue)]) -> SettingsResult<()>;

    /// Remove a key. Removing an unset key is not an error.
    fn remove(&self, key: &str) -> SettingsResult<()>;

    /// All stored entries, sorted by key.
    fn entries(&self) -> SettingsResult<Vec<(String, SettingValue)>>;

    /// Read a boolean setting.
    fn get_bool(&self, key: &str) -> SettingsResult<Option<bool>> {
        match self.get_value(key)? {
            None => Ok(None),
            Some(SettingValue::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(mismatch(key, "bool", &other)),
        }
    }

    /// Write a boolean setting.
    fn set_bool(&self, key: &str, value: bool) -> SettingsResult<()> {
        self.set_value(key, SettingValue::Bool(value))
    }

    /// Read an integer setting.
    fn get_int(&self, key: &str) -> SettingsResult<Option<i64>> {
        match self.get_value(key)? {
            None => Ok(None),
            Some(SettingValue::Int(i)) => Ok(Some(i)),
            Some(other) => Err(mismatch(key, "int", &other)),
        }
    }

    /// Write an integer setting.
    fn set_int(&self, key: &str, value: i64) -> SettingsResult<()> {
        self.set_value(key, SettingValue::Int(value))
    }

    /// Read a string setting.
    fn get_string(&self, key: &str) -> SettingsResult<Option<String>> {
        match self.get_value(key)? {
            None => Ok(None),
            Some(SettingValue::Text(s)) => Ok(Some(s)),
            Some(other) => Err(mismatch(key, "string", &other)),
        }
    }

    /// Write a string setting.
    fn set_string(&self, key: &str, value: &str) -> SettingsResult<()> {
        self.set_value(key, SettingValue::Text(value.to_string()))
    }
}

fn mismatch(key: &str, expected: &'static str, found: &SettingValue) -> SettingsError {
    tracing::debug!(key, expected, found = found.type_name(), "setting type mismatch");
    SettingsError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_json_shape() {
        let values = vec![
            SettingValue::Bool(true),
            SettingValue::Int(1_700_000_000_000),
            SettingValue::Text("Mira".to_string()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[true,1700000000000,"Mira"]"#);
        let back: Vec<SettingValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn display_values() {
        assert_eq!(SettingValue::Bool(false).to_string(), "false");
        assert_eq!(SettingValue::Int(-3).to_string(), "-3");
        assert_eq!(SettingValue::Text("Mira".into()).to_string(), "\"Mira\"");
    }
}
