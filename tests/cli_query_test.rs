//! Integration tests for the terminal query commands: tree, next, search, show.

mod common;

use common::{SAMPLE_DOCUMENT, TestEnv};
use predicates::prelude::*;

fn sample() -> TestEnv {
    let env = TestEnv::new();
    env.write_raw(SAMPLE_DOCUMENT);
    env
}

#[test]
fn test_tree_on_empty_store_initializes_file() {
    let env = TestEnv::new();

    let tree = env.json(&["tree"]);
    assert_eq!(tree, serde_json::json!([]));

    let raw = std::fs::read_to_string(env.data_file()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["version"], "1.0.0");
    assert_eq!(doc["threads"], serde_json::json!([]));
}

#[test]
fn test_tree_human() {
    let env = sample();

    env.cmd()
        .args(["tree", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project/\n  Sub/\n    Task2"))
        .stdout(predicate::str::contains("\nLoose (paused, hot, importance 3)"));
}

#[test]
fn test_next_ignores_paused_threads() {
    let env = sample();

    // Loose is hot/3 but paused, so hot/2 Task2 wins
    let next = env.json(&["next"]);
    assert_eq!(next["next"]["name"], "Task2");
}

#[test]
fn test_search_matches_tags_and_descriptions() {
    let env = sample();

    let by_tag = env.json(&["search", "GARDEN"]);
    assert_eq!(by_tag["count"], 1);
    assert_eq!(by_tag["results"][0]["id"], "t-1");

    let by_description = env.json(&["search", "tomato"]);
    assert_eq!(by_description["results"][0]["id"], "t-1");

    env.cmd()
        .args(["search", "zzz", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches"));
}

#[test]
fn test_show_by_name_and_id() {
    let env = sample();

    let task = env.json(&["show", "task1"]);
    assert_eq!(task["id"], "t-1");
    assert_eq!(task["type"], "thread");

    let container = env.json(&["show", "c-2"]);
    assert_eq!(container["type"], "container");

    let group = env.json(&["show", "Home"]);
    assert_eq!(group["description"], "Household things");
}

#[test]
fn test_show_missing_fails_with_json_error() {
    let env = sample();

    env.cmd()
        .args(["show", "nothing"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(r#""error""#))
        .stderr(predicate::str::contains("nothing"));
}

#[test]
fn test_show_missing_human_error() {
    let env = sample();

    env.cmd()
        .args(["show", "nothing", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn test_malformed_data_file_is_an_error() {
    let env = TestEnv::new();
    env.write_raw("{ not json");

    env.cmd()
        .args(["tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));
}

#[test]
fn test_legacy_records_are_normalized() {
    let env = TestEnv::new();
    env.write_raw(
        r#"{
            "threads": [
                { "id": "old", "name": "Old", "tags": null,
                  "createdAt": "2023-01-01T00:00:00Z", "updatedAt": "2023-01-01T00:00:00Z" }
            ],
            "version": "1.0.0"
        }"#,
    );

    let shown = env.json(&["show", "old"]);
    assert_eq!(shown["tags"], serde_json::json!([]));
    assert_eq!(shown["description"], "");
    assert_eq!(shown["status"], "active");
    assert_eq!(shown["temperature"], "warm");
}
