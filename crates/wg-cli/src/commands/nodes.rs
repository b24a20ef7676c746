use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(story: &Path) -> Result<(), String> {
    let graph = super::load_story(story)?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Choices", "Animation", "Text"]);

    for node in graph.nodes() {
        let choices = if node.is_ending() {
            "(ending)".to_string()
        } else {
            node.choices
                .iter()
                .map(|c| c.target.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let animation = if node.animation_ref.is_empty() {
            "—"
        } else {
            node.animation_ref.as_str()
        };
        table.add_row(vec![
            node.id.as_str(),
            &choices,
            animation,
            &super::truncate(&node.text, 60),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} nodes", graph.len());

    Ok(())
}
