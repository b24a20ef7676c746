//! Well-known setting keys.

/// Whether the player already rated the app (`bool`).
pub const HAS_RATED: &str = "has_rated";

/// Epoch milliseconds of the last shown rating prompt (`int`).
pub const LAST_RATING_PROMPT: &str = "last_rating_prompt";

/// Display name used to personalize prompts (`string`).
pub const USER_NAME: &str = "user_name";

/// Name used when [`USER_NAME`] is unset.
pub const DEFAULT_USER_NAME: &str = "Adventurer";
