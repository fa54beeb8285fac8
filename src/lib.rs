//! Threads - a personal activity tracker served over MCP.
//!
//! This library provides the core functionality for the `threads-mcp` binary,
//! including thread/container/group management, progress logs, hierarchy
//! queries, and the stdio MCP server that exposes them.

pub mod cli;
pub mod commands;
pub mod config;
pub mod mcp;
pub mod models;
pub mod storage;

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::Path;
    use tempfile::TempDir;

    use crate::storage::{Store, StorePaths};

    /// Test environment with an isolated data directory.
    ///
    /// Stores are built by dependency injection, so nothing here touches
    /// `~/.threads` or the process environment.
    pub struct TestEnv {
        /// Isolated data storage directory
        pub data_dir: TempDir,
    }

    impl TestEnv {
        /// Create a new test environment with an empty data directory.
        pub fn new() -> Self {
            Self {
                data_dir: TempDir::new().unwrap(),
            }
        }

        /// Get the path to the isolated data directory.
        pub fn data_path(&self) -> &Path {
            self.data_dir.path()
        }

        /// Open a store backed by this environment's data directory.
        pub fn store(&self) -> Store {
            Store::new(StorePaths::in_dir(self.data_path()))
        }

        /// Write raw JSON as the primary data file, bypassing the store.
        pub fn write_raw(&self, json: &str) {
            std::fs::write(StorePaths::in_dir(self.data_path()).data_file, json).unwrap();
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for Threads operations.
///
/// Lookups that miss are not errors: store operations report absence through
/// `Option`/`bool`. Errors here mean the call itself could not complete.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Threads operations.
pub type Result<T> = std::result::Result<T, Error>;
