//! Storage layer for Threads data.
//!
//! All state lives in one pretty-printed JSON document (`threads.json`) with a
//! single-slot backup (`threads.backup.json`) next to it.
//!
//! ## Access pattern
//!
//! Every operation loads the whole document from disk; every mutation writes
//! the whole document back after copying the previous file over the backup.
//! Nothing is cached between calls, so edits made by other tools sharing the
//! file are picked up immediately. There is no locking: if two processes save
//! concurrently the last write wins.
//!
//! Lookups that miss return `None`/`false`. Only I/O and malformed-document
//! failures are returned as errors.

pub mod hierarchy;
pub mod progress;
pub mod query;

use crate::models::{
    Container, CreateContainerInput, CreateGroupInput, CreateThreadInput, Document, Group, Thread,
    ThreadStatus, UpdateContainerInput, UpdateGroupInput, UpdateThreadInput,
};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the primary data file inside the data directory.
pub const DATA_FILE_NAME: &str = "threads.json";

/// File name of the single-slot backup inside the data directory.
pub const BACKUP_FILE_NAME: &str = "threads.backup.json";

/// Locations of the backing files for a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub data_file: PathBuf,
    pub backup_file: PathBuf,
}

impl StorePaths {
    /// Standard file layout inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            data_file: dir.join(DATA_FILE_NAME),
            backup_file: dir.join(BACKUP_FILE_NAME),
        }
    }
}

/// Storage manager for a single `threads.json` document.
#[derive(Debug, Clone)]
pub struct Store {
    paths: StorePaths,
}

impl Store {
    /// Create a store over the given files. Nothing is touched until the first operation.
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Create the data directory and an empty document if the data file is missing.
    fn ensure_data_file(&self) -> Result<()> {
        if let Some(dir) = self.paths.data_file.parent() {
            fs::create_dir_all(dir)?;
        }
        if !self.paths.data_file.exists() {
            info!(path = %self.paths.data_file.display(), "initializing empty data file");
            write_document(&self.paths.data_file, &Document::default())?;
        }
        Ok(())
    }

    /// Read the current document from disk.
    ///
    /// Records written by older versions are normalized while deserializing:
    /// missing `tags`, `description` and `containers` come back empty.
    /// Dangling `parentId`/`groupId` references are left as they are.
    pub fn load(&self) -> Result<Document> {
        self.ensure_data_file()?;
        let raw = fs::read_to_string(&self.paths.data_file)?;
        let doc: Document = serde_json::from_str(&raw)?;
        debug!(
            threads = doc.threads.len(),
            containers = doc.containers.len(),
            groups = doc.groups.len(),
            "loaded document"
        );
        Ok(doc)
    }

    /// Persist the full document, rotating the previous file into the backup slot.
    pub fn save(&self, doc: &Document) -> Result<()> {
        self.ensure_data_file()?;
        self.create_backup()?;
        write_document(&self.paths.data_file, doc)?;
        debug!(path = %self.paths.data_file.display(), "saved document");
        Ok(())
    }

    fn create_backup(&self) -> Result<()> {
        if self.paths.data_file.exists() {
            fs::copy(&self.paths.data_file, &self.paths.backup_file)?;
        }
        Ok(())
    }

    // === Thread Operations ===

    /// Get a thread by ID.
    pub fn get_thread(&self, id: &str) -> Result<Option<Thread>> {
        Ok(self.load()?.thread(id).cloned())
    }

    /// Get a thread by case-insensitive name.
    pub fn get_thread_by_name(&self, name: &str) -> Result<Option<Thread>> {
        Ok(self.load()?.thread_by_name(name).cloned())
    }

    /// Resolve a thread by ID, falling back to name.
    pub fn find_thread(&self, identifier: &str) -> Result<Option<Thread>> {
        let doc = self.load()?;
        Ok(doc
            .thread(identifier)
            .or_else(|| doc.thread_by_name(identifier))
            .cloned())
    }

    /// Create a new thread.
    ///
    /// `parent_id` and `group_id` are stored as given without checking that
    /// they resolve; use `set_parent`/`move_to_group` for validated assignment.
    pub fn create_thread(&self, input: CreateThreadInput) -> Result<Thread> {
        require_name(&input.name)?;
        let mut doc = self.load()?;

        let mut thread = Thread::new(generate_id(), input.name);
        thread.description = input.description.unwrap_or_default();
        thread.status = input.status.unwrap_or_default();
        thread.temperature = input.temperature.unwrap_or_default();
        thread.size = input.size.unwrap_or_default();
        thread.importance = input.importance.unwrap_or_default();
        thread.parent_id = input.parent_id;
        thread.group_id = input.group_id;
        thread.tags = input.tags.unwrap_or_default();

        doc.threads.push(thread.clone());
        self.save(&doc)?;
        info!(id = %thread.id, name = %thread.name, "created thread");
        Ok(thread)
    }

    /// Apply the provided fields to a thread.
    pub fn update_thread(&self, id: &str, changes: UpdateThreadInput) -> Result<Option<Thread>> {
        if let Some(name) = &changes.name {
            require_name(name)?;
        }
        let mut doc = self.load()?;
        let Some(thread) = doc.thread_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            thread.name = name;
        }
        if let Some(description) = changes.description {
            thread.description = description;
        }
        if let Some(status) = changes.status {
            thread.status = status;
        }
        if let Some(temperature) = changes.temperature {
            thread.temperature = temperature;
        }
        if let Some(size) = changes.size {
            thread.size = size;
        }
        if let Some(importance) = changes.importance {
            thread.importance = importance;
        }
        if let Some(parent_id) = changes.parent_id {
            thread.parent_id = parent_id;
        }
        if let Some(group_id) = changes.group_id {
            thread.group_id = group_id;
        }
        if let Some(tags) = changes.tags {
            thread.tags = tags;
        }
        thread.touch();

        let updated = thread.clone();
        self.save(&doc)?;
        info!(id, "updated thread");
        Ok(Some(updated))
    }

    /// Archive a thread, and with `cascade` its direct child threads.
    ///
    /// Grandchildren are not touched.
    pub fn archive_thread(&self, id: &str, cascade: bool) -> Result<Option<Thread>> {
        let mut doc = self.load()?;
        let Some(thread) = doc.thread_mut(id) else {
            return Ok(None);
        };
        thread.status = ThreadStatus::Archived;
        thread.touch();
        let archived = thread.clone();

        let mut children = 0;
        if cascade {
            for child in doc
                .threads
                .iter_mut()
                .filter(|t| t.parent_id.as_deref() == Some(id))
            {
                child.status = ThreadStatus::Archived;
                child.touch();
                children += 1;
            }
        }

        self.save(&doc)?;
        info!(id, cascade, children, "archived thread");
        Ok(Some(archived))
    }

    /// Remove a thread. Children keep their (now dangling) `parent_id`.
    pub fn delete_thread(&self, id: &str) -> Result<bool> {
        let mut doc = self.load()?;
        let Some(index) = doc.threads.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        doc.threads.remove(index);
        self.save(&doc)?;
        info!(id, "deleted thread");
        Ok(true)
    }

    // === Container Operations ===

    pub fn get_container(&self, id: &str) -> Result<Option<Container>> {
        Ok(self.load()?.container(id).cloned())
    }

    pub fn get_container_by_name(&self, name: &str) -> Result<Option<Container>> {
        Ok(self.load()?.container_by_name(name).cloned())
    }

    /// Resolve a container by ID, falling back to name.
    pub fn find_container(&self, identifier: &str) -> Result<Option<Container>> {
        let doc = self.load()?;
        Ok(doc
            .container(identifier)
            .or_else(|| doc.container_by_name(identifier))
            .cloned())
    }

    /// Create a new container. Relation fields are not validated.
    pub fn create_container(&self, input: CreateContainerInput) -> Result<Container> {
        require_name(&input.name)?;
        let mut doc = self.load()?;

        let mut container = Container::new(generate_id(), input.name);
        container.description = input.description.unwrap_or_default();
        container.parent_id = input.parent_id;
        container.group_id = input.group_id;
        container.tags = input.tags.unwrap_or_default();

        doc.containers.push(container.clone());
        self.save(&doc)?;
        info!(id = %container.id, name = %container.name, "created container");
        Ok(container)
    }

    pub fn update_container(
        &self,
        id: &str,
        changes: UpdateContainerInput,
    ) -> Result<Option<Container>> {
        if let Some(name) = &changes.name {
            require_name(name)?;
        }
        let mut doc = self.load()?;
        let Some(container) = doc.container_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            container.name = name;
        }
        if let Some(description) = changes.description {
            container.description = description;
        }
        if let Some(parent_id) = changes.parent_id {
            container.parent_id = parent_id;
        }
        if let Some(group_id) = changes.group_id {
            container.group_id = group_id;
        }
        if let Some(tags) = changes.tags {
            container.tags = tags;
        }
        container.touch();

        let updated = container.clone();
        self.save(&doc)?;
        info!(id, "updated container");
        Ok(Some(updated))
    }

    /// Remove a container. Children keep their (now dangling) `parent_id`.
    pub fn delete_container(&self, id: &str) -> Result<bool> {
        let mut doc = self.load()?;
        let Some(index) = doc.containers.iter().position(|c| c.id == id) else {
            return Ok(false);
        };
        doc.containers.remove(index);
        self.save(&doc)?;
        info!(id, "deleted container");
        Ok(true)
    }

    // === Group Operations ===

    pub fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.load()?.groups)
    }

    pub fn get_group(&self, id: &str) -> Result<Option<Group>> {
        Ok(self.load()?.group(id).cloned())
    }

    pub fn get_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        Ok(self.load()?.group_by_name(name).cloned())
    }

    /// Resolve a group by ID, falling back to name.
    pub fn find_group(&self, identifier: &str) -> Result<Option<Group>> {
        let doc = self.load()?;
        Ok(doc
            .group(identifier)
            .or_else(|| doc.group_by_name(identifier))
            .cloned())
    }

    pub fn create_group(&self, input: CreateGroupInput) -> Result<Group> {
        require_name(&input.name)?;
        let mut doc = self.load()?;

        let mut group = Group::new(generate_id(), input.name);
        group.description = input.description.unwrap_or_default();

        doc.groups.push(group.clone());
        self.save(&doc)?;
        info!(id = %group.id, name = %group.name, "created group");
        Ok(group)
    }

    pub fn update_group(&self, id: &str, changes: UpdateGroupInput) -> Result<Option<Group>> {
        if let Some(name) = &changes.name {
            require_name(name)?;
        }
        let mut doc = self.load()?;
        let Some(group) = doc.group_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            group.name = name;
        }
        if let Some(description) = changes.description {
            group.description = description;
        }
        group.touch();

        let updated = group.clone();
        self.save(&doc)?;
        info!(id, "updated group");
        Ok(Some(updated))
    }

    /// Remove a group. Members keep their (now dangling) `group_id`.
    pub fn delete_group(&self, id: &str) -> Result<bool> {
        let mut doc = self.load()?;
        let Some(index) = doc.groups.iter().position(|g| g.id == id) else {
            return Ok(false);
        };
        doc.groups.remove(index);
        self.save(&doc)?;
        info!(id, "deleted group");
        Ok(true)
    }
}

fn write_document(path: &Path, doc: &Document) -> Result<()> {
    let json = serde_json::to_string_pretty(doc)?;
    fs::write(path, json)?;
    Ok(())
}

fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("name must not be empty".to_string()));
    }
    Ok(())
}

/// Generate a fresh opaque identifier.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
