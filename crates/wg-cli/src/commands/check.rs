use std::path::Path;

use colored::Colorize;

pub fn run(story: &Path) -> Result<(), String> {
    let graph = super::load_story(story)?;
    let issues = graph.validate();
    let name = graph
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| story.display().to_string());

    if issues.is_empty() {
        println!("  All checks passed for '{name}'.");
    } else {
        for issue in &issues {
            println!("  {} {issue}", "warning:".yellow().bold());
        }
        println!("  {} warning(s) in '{name}'.", issues.len());
    }
    println!("  {} nodes, {} choices", graph.len(), graph.choice_count());

    Ok(())
}
