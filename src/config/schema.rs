//! KDL schema definition for config.kdl.
//!
//! This module provides:
//! - A Rust struct representing the KDL schema
//! - Parsing from and serialization to KDL
//! - Validation of the parsed values

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use std::path::Path;

use crate::{Error, Result};

/// Log levels accepted by the `log-level` setting.
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// // Where threads.json and its backup live
/// data-dir "~/.threads"
/// log-level "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadsConfig {
    /// Directory holding the data file (may start with `~`)
    pub data_dir: Option<String>,

    /// Default log level when `RUST_LOG` is unset
    pub log_level: Option<String>,
}

impl ThreadsConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(ref dir) = self.data_dir {
            if dir.trim().is_empty() {
                return Err("data-dir must not be empty".to_string());
            }
        }
        if let Some(ref level) = self.log_level {
            if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(format!(
                    "log-level must be one of {}, got {}",
                    LOG_LEVELS.join(", "),
                    level
                ));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document. Unknown nodes are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(node) = doc.get("data-dir") {
            if let Some(entry) = node.entries().first() {
                if let Some(s) = entry.value().as_string() {
                    config.data_dir = Some(s.to_string());
                }
            }
        }

        if let Some(node) = doc.get("log-level") {
            if let Some(entry) = node.entries().first() {
                if let Some(s) = entry.value().as_string() {
                    config.log_level = Some(s.to_string());
                }
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref dir) = self.data_dir {
            let mut node = KdlNode::new("data-dir");
            node.push(KdlEntry::new(KdlValue::String(dir.clone())));
            doc.nodes_mut().push(node);
        }

        if let Some(ref level) = self.log_level {
            let mut node = KdlNode::new("log-level");
            node.push(KdlEntry::new(KdlValue::String(level.clone())));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Parse and validate config text.
    pub fn parse(text: &str) -> Result<Self> {
        let doc: KdlDocument = text
            .parse()
            .map_err(|e| Error::Config(format!("invalid KDL: {}", e)))?;
        let config = Self::from_kdl(&doc);
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    /// Load config from `path`. A missing file yields an empty config.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), config_message(e))))
    }
}

fn config_message(err: Error) -> String {
    match err {
        Error::Config(msg) => msg,
        other => other.to_string(),
    }
}
