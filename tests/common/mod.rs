//! Common test utilities for threads-mcp integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's `~/.threads` directory or config.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// The `cmd()` method returns a `Command` with `THREADS_DATA_DIR` and
/// `THREADS_CONFIG` set per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the threads-mcp binary with isolated directories.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_threads-mcp"));
        cmd.env("THREADS_DATA_DIR", self.data_dir.path());
        cmd.env("THREADS_CONFIG", self.config_path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    /// Path of the (initially absent) config.kdl used by `cmd()`.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().join("config.kdl")
    }

    /// Path of the primary data file.
    pub fn data_file(&self) -> PathBuf {
        self.data_path().join("threads.json")
    }

    /// Write raw JSON as the data file, bypassing the binary.
    pub fn write_raw(&self, json: &str) {
        std::fs::write(self.data_file(), json).unwrap();
    }

    /// Write config.kdl contents.
    pub fn write_config(&self, kdl: &str) {
        std::fs::write(self.config_path(), kdl).unwrap();
    }

    /// Run a command and parse its stdout as JSON, asserting success.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A small document exercising every entity kind.
///
/// ```text
/// Project (container, group g-1)
/// ├── Sub (container)
/// │   └── Task2 (thread, hot/2)
/// └── Task1 (thread, warm/5, tags: garden)
/// Loose (thread, paused)
/// ```
pub const SAMPLE_DOCUMENT: &str = r#"{
  "threads": [
    {
      "type": "thread",
      "id": "t-1",
      "name": "Task1",
      "description": "Plant tomatoes",
      "status": "active",
      "importance": 5,
      "temperature": "warm",
      "size": "small",
      "parentId": "c-1",
      "groupId": null,
      "tags": ["garden"],
      "dependencies": [],
      "progress": [
        { "id": "p-1", "timestamp": "2024-04-01T09:00:00Z", "note": "Bought seeds" }
      ],
      "details": [],
      "createdAt": "2024-03-01T09:00:00Z",
      "updatedAt": "2024-04-01T09:00:00Z"
    },
    {
      "type": "thread",
      "id": "t-2",
      "name": "Task2",
      "status": "active",
      "importance": 2,
      "temperature": "hot",
      "size": "medium",
      "parentId": "c-2",
      "createdAt": "2024-03-02T09:00:00Z",
      "updatedAt": "2024-03-02T09:00:00Z"
    },
    {
      "type": "thread",
      "id": "t-3",
      "name": "Loose",
      "status": "paused",
      "importance": 3,
      "temperature": "hot",
      "size": "tiny",
      "parentId": null,
      "createdAt": "2024-03-03T09:00:00Z",
      "updatedAt": "2024-03-03T09:00:00Z"
    }
  ],
  "containers": [
    {
      "type": "container",
      "id": "c-1",
      "name": "Project",
      "description": "",
      "parentId": null,
      "groupId": "g-1",
      "tags": [],
      "createdAt": "2024-03-01T08:00:00Z",
      "updatedAt": "2024-03-01T08:00:00Z"
    },
    {
      "type": "container",
      "id": "c-2",
      "name": "Sub",
      "parentId": "c-1",
      "createdAt": "2024-03-01T08:30:00Z",
      "updatedAt": "2024-03-01T08:30:00Z"
    }
  ],
  "groups": [
    {
      "id": "g-1",
      "name": "Home",
      "description": "Household things",
      "createdAt": "2024-03-01T07:00:00Z",
      "updatedAt": "2024-03-01T07:00:00Z"
    }
  ],
  "version": "1.0.0"
}"#;
