pub mod check;
pub mod nodes;
pub mod play;
pub mod settings;

use std::path::Path;

use wg_story::StoryGraph;

/// Load a story file, turning errors into CLI messages.
fn load_story(path: &Path) -> Result<StoryGraph, String> {
    StoryGraph::from_path(path).map_err(|e| e.to_string())
}

/// Shorten `text` to at most `max` characters, ending in "..." if cut.
fn truncate(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
