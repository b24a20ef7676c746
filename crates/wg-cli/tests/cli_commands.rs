//! CLI command integration tests.
#![allow(deprecated)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FOREST: &str = r#"{
  "title": "The Forest Path",
  "nodes": [
    {
      "id": "start",
      "text": "A fork in the road.",
      "choices": [
        { "label": "Enter the forest", "target": "forest" },
        { "label": "Follow the river", "target": "river" }
      ]
    },
    { "id": "forest", "text": "Trees close in.", "animation": "forest_loop" },
    { "id": "river", "text": "Water murmurs beside you." }
  ]
}"#;

fn wg() -> Command {
    Command::cargo_bin("wg").unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn check_clean_story() {
    let dir = TempDir::new().unwrap();
    let story = write(dir.path(), "forest.json", FOREST);

    wg().arg("check")
        .arg(&story)
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"))
        .stdout(predicate::str::contains("3 nodes, 2 choices"));
}

#[test]
fn check_reports_dangling_target_with_suggestion() {
    let dir = TempDir::new().unwrap();
    let story = write(
        dir.path(),
        "typo.json",
        r#"{ "nodes": [
            { "id": "start", "text": "Go.", "choices": [{ "label": "On", "target": "foresst" }] },
            { "id": "forest", "text": "Trees." }
        ] }"#,
    );

    wg().arg("check")
        .arg(&story)
        .assert()
        .success()
        .stdout(predicate::str::contains("foresst"))
        .stdout(predicate::str::contains("did you mean 'forest'"));
}

#[test]
fn check_rejects_story_without_start() {
    let dir = TempDir::new().unwrap();
    let story = write(
        dir.path(),
        "nostart.json",
        r#"{ "nodes": [{ "id": "intro", "text": "Hi." }] }"#,
    );

    wg().arg("check")
        .arg(&story)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn check_missing_file_fails() {
    wg().arg("check")
        .arg("/nonexistent/story.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn nodes_lists_every_node() {
    let dir = TempDir::new().unwrap();
    let story = write(dir.path(), "forest.json", FOREST);

    wg().arg("nodes")
        .arg(&story)
        .assert()
        .success()
        .stdout(predicate::str::contains("forest_loop"))
        .stdout(predicate::str::contains("(ending)"))
        .stdout(predicate::str::contains("3 nodes"));
}

#[test]
fn play_commits_a_held_choice() {
    let dir = TempDir::new().unwrap();
    let story = write(dir.path(), "forest.json", FOREST);
    let settings = dir.path().join("settings.json");

    wg().arg("play")
        .arg(&story)
        .arg("--settings")
        .arg(&settings)
        .args(["--hold-ms", "20", "--instant"])
        .write_stdin("hold 1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("A fork in the road."))
        .stdout(predicate::str::contains("[1] Enter the forest"))
        .stdout(predicate::str::contains("Trees close in."))
        .stdout(predicate::str::contains("The End."));
}

#[test]
fn play_release_cancels_the_hold() {
    let dir = TempDir::new().unwrap();
    let story = write(dir.path(), "forest.json", FOREST);
    let settings = dir.path().join("settings.json");

    wg().arg("play")
        .arg(&story)
        .arg("--settings")
        .arg(&settings)
        .args(["--hold-ms", "60000", "--instant"])
        .write_stdin("hold 2\nrelease\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Released \"Follow the river\""))
        .stdout(predicate::str::contains("Water murmurs").not());
}

#[test]
fn play_quit_leaves_immediately() {
    let dir = TempDir::new().unwrap();
    let story = write(dir.path(), "forest.json", FOREST);
    let settings = dir.path().join("settings.json");

    wg().arg("play")
        .arg(&story)
        .arg("--settings")
        .arg(&settings)
        .arg("--instant")
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Farewell."));
}

#[test]
fn settings_sets_and_shows_name() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");

    wg().arg("settings")
        .arg(&file)
        .args(["--name", "  Mira "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Player: Mira"));

    let saved = std::fs::read_to_string(&file).unwrap();
    assert!(saved.contains("\"user_name\": \"Mira\""));
}

#[test]
fn settings_empty_file_uses_default_name() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("fresh.json");

    wg().arg("settings")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No settings stored"))
        .stdout(predicate::str::contains("Player: Adventurer"))
        .stdout(predicate::str::contains("Last prompt: never"));
}
