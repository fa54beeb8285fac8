//! Command implementations for the threads-mcp CLI.
//!
//! Each command returns a value implementing [`Output`] so `main` can print
//! it as JSON (default) or human-readable text (`-H`).

use serde::Serialize;
use std::fmt::Write as _;

use crate::config::ResolvedConfig;
use crate::models::{Entity, Group, Thread, TreeNode};
use crate::storage::Store;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

fn thread_summary(thread: &Thread) -> String {
    format!(
        "{} ({}, {}, importance {})",
        thread.name, thread.status, thread.temperature, thread.importance
    )
}

/// `YYYY-MM-DD HH:MM` for RFC 3339 timestamps, anything else as written.
fn short_timestamp(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn entity_line(entity: &Entity) -> String {
    match entity {
        Entity::Thread(thread) => thread_summary(thread),
        Entity::Container(container) => format!("{}/", container.name),
    }
}

// ==================== tree ====================

#[derive(Serialize)]
#[serde(transparent)]
pub struct TreeResult {
    pub roots: Vec<TreeNode>,
}

fn render_node(out: &mut String, node: &TreeNode, depth: usize) {
    let _ = writeln!(out, "{}{}", "  ".repeat(depth), entity_line(&node.entity));
    for child in &node.children {
        render_node(out, child, depth + 1);
    }
}

impl Output for TreeResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.roots.is_empty() {
            return "No threads or containers.".to_string();
        }
        let mut out = String::new();
        for root in &self.roots {
            render_node(&mut out, root, 0);
        }
        out.trim_end().to_string()
    }
}

/// The whole hierarchy, roots first.
pub fn tree(store: &Store) -> Result<TreeResult> {
    Ok(TreeResult {
        roots: store.get_full_tree()?,
    })
}

// ==================== next ====================

#[derive(Serialize)]
pub struct NextResult {
    pub next: Option<Thread>,
}

impl Output for NextResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.next {
            Some(thread) => format!("Next: {}\n  id: {}", thread_summary(thread), thread.id),
            None => "No active threads.".to_string(),
        }
    }
}

pub fn next(store: &Store) -> Result<NextResult> {
    Ok(NextResult {
        next: store.get_next_action()?,
    })
}

// ==================== search ====================

#[derive(Serialize)]
pub struct SearchResult {
    pub query: String,
    pub count: usize,
    pub results: Vec<Entity>,
}

impl Output for SearchResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.results.is_empty() {
            return format!("No matches for \"{}\".", self.query);
        }
        let mut out = format!("{} match(es) for \"{}\":", self.count, self.query);
        for entity in &self.results {
            let _ = write!(out, "\n  [{}] {}", entity.kind(), entity_line(entity));
        }
        out
    }
}

pub fn search(store: &Store, query: &str) -> Result<SearchResult> {
    let results = store.search(query)?;
    Ok(SearchResult {
        query: query.to_string(),
        count: results.len(),
        results,
    })
}

// ==================== show ====================

/// A thread, container or group found by id or name.
#[derive(Serialize)]
#[serde(untagged)]
pub enum ShowResult {
    Entity(Entity),
    Group(Group),
}

impl Output for ShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self {
            ShowResult::Entity(Entity::Thread(thread)) => {
                let mut out = format!("Thread: {}\n  id: {}", thread_summary(thread), thread.id);
                if !thread.description.is_empty() {
                    let _ = write!(out, "\n  {}", thread.description);
                }
                if !thread.tags.is_empty() {
                    let _ = write!(out, "\n  tags: {}", thread.tags.join(", "));
                }
                for entry in thread.progress.iter().rev() {
                    let _ = write!(
                        out,
                        "\n  - {} {}",
                        short_timestamp(&entry.timestamp),
                        entry.note
                    );
                }
                out
            }
            ShowResult::Entity(Entity::Container(container)) => {
                let mut out = format!("Container: {}\n  id: {}", container.name, container.id);
                if !container.description.is_empty() {
                    let _ = write!(out, "\n  {}", container.description);
                }
                out
            }
            ShowResult::Group(group) => {
                let mut out = format!("Group: {}\n  id: {}", group.name, group.id);
                if !group.description.is_empty() {
                    let _ = write!(out, "\n  {}", group.description);
                }
                out
            }
        }
    }
}

/// Look up a thread or container, then a group, by id or name.
pub fn show(store: &Store, identifier: &str) -> Result<ShowResult> {
    if let Some(entity) = store.find_entity(identifier)? {
        return Ok(ShowResult::Entity(entity));
    }
    if let Some(group) = store.find_group(identifier)? {
        return Ok(ShowResult::Group(group));
    }
    Err(Error::NotFound(identifier.to_string()))
}

// ==================== config show ====================

#[derive(Serialize)]
pub struct SourcedValue {
    pub value: String,
    pub source: String,
}

#[derive(Serialize)]
pub struct ConfigShowResult {
    pub config_file: Option<SourcedValue>,
    pub data_dir: SourcedValue,
    pub log_level: SourcedValue,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let config_file = match &self.config_file {
            Some(file) => format!("{} ({})", file.value, file.source),
            None => "(none)".to_string(),
        };
        format!(
            "config-file: {}\ndata-dir: {} ({})\nlog-level: {} ({})",
            config_file,
            self.data_dir.value,
            self.data_dir.source,
            self.log_level.value,
            self.log_level.source
        )
    }
}

/// Resolved configuration values with where each came from.
pub fn config_show(config: &ResolvedConfig) -> ConfigShowResult {
    ConfigShowResult {
        config_file: config.config_file.as_ref().map(|file| SourcedValue {
            value: file.value.display().to_string(),
            source: file.source.to_string(),
        }),
        data_dir: SourcedValue {
            value: config.data_dir.value.display().to_string(),
            source: config.data_dir.source.to_string(),
        },
        log_level: SourcedValue {
            value: config.log_level.value.clone(),
            source: config.log_level.source.to_string(),
        },
    }
}
