use std::path::Path;

use chrono::{TimeZone, Utc};
use comfy_table::{ContentArrangement, Table};
use wg_settings::keys::{HAS_RATED, LAST_RATING_PROMPT, USER_NAME};
use wg_settings::{
    JsonFileSettings, ReviewPromptRecord, SettingsStore, set_user_name, user_display_name,
};

pub fn run(file: &Path, name: Option<&str>, reset: bool) -> Result<(), String> {
    let store = JsonFileSettings::open(file).map_err(|e| e.to_string())?;

    if reset {
        for key in [HAS_RATED, LAST_RATING_PROMPT, USER_NAME] {
            store.remove(key).map_err(|e| e.to_string())?;
        }
        println!("  Settings reset.");
    }
    if let Some(name) = name {
        set_user_name(&store, name).map_err(|e| e.to_string())?;
    }

    let entries = store.entries().map_err(|e| e.to_string())?;
    if entries.is_empty() {
        println!("  No settings stored in {}.", store.path().display());
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Key", "Value"]);
        for (key, value) in &entries {
            table.add_row(vec![key.clone(), value.to_string()]);
        }
        println!("{table}");
    }

    println!();
    println!("  Player: {}", user_display_name(&store));
    match ReviewPromptRecord::load(&store) {
        Ok(record) => {
            let last = if record.last_prompt_at_millis == 0 {
                "never".to_string()
            } else {
                Utc.timestamp_millis_opt(record.last_prompt_at_millis)
                    .single()
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| record.last_prompt_at_millis.to_string())
            };
            println!("  Rated: {} | Last prompt: {last}", record.has_rated);
        }
        Err(e) => println!("  Rating record unreadable: {e}"),
    }

    Ok(())
}
