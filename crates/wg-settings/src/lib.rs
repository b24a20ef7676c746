//! Persisted player settings for Wegweiser.
//!
//! Settings are a flat key/value map behind the [`SettingsStore`] trait.
//! Two backends ship with the crate: [`MemorySettings`] for tests and
//! ephemeral sessions, and [`JsonFileSettings`], which keeps a JSON file
//! on disk and rewrites it atomically on every change.
//!
//! The engine only needs three keys (see [`keys`]); they are read and
//! written through [`ReviewPromptRecord`] and [`user_display_name`].

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod record;
pub mod store;

pub use error::{SettingsError, SettingsResult};
pub use file::JsonFileSettings;
pub use memory::MemorySettings;
pub use record::{ReviewPromptRecord, set_user_name, user_display_name};
pub use store::{SettingValue, SettingsStore};
