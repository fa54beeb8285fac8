//! Hierarchy operations over threads and containers.
//!
//! The parent graph is not validated on load, so traversals carry a guard:
//! an entity already on the current path is never visited again. On acyclic
//! data this changes nothing.

use super::Store;
use crate::Result;
use crate::models::{Document, Entity, TreeNode};
use std::collections::HashSet;
use tracing::{info, warn};

impl Store {
    // === Entity Operations ===

    /// Resolve an ID to a thread or container, threads first.
    pub fn get_entity(&self, id: &str) -> Result<Option<Entity>> {
        Ok(self.load()?.entity(id))
    }

    /// Resolve a name (case-insensitive) to a thread or container, threads first.
    pub fn get_entity_by_name(&self, name: &str) -> Result<Option<Entity>> {
        let doc = self.load()?;
        Ok(doc
            .thread_by_name(name)
            .cloned()
            .map(Entity::Thread)
            .or_else(|| doc.container_by_name(name).cloned().map(Entity::Container)))
    }

    /// Resolve an entity by ID, falling back to name.
    pub fn find_entity(&self, identifier: &str) -> Result<Option<Entity>> {
        match self.get_entity(identifier)? {
            Some(entity) => Ok(Some(entity)),
            None => self.get_entity_by_name(identifier),
        }
    }

    /// Every thread followed by every container.
    pub fn get_all_entities(&self) -> Result<Vec<Entity>> {
        let doc = self.load()?;
        let threads = doc.threads.into_iter().map(Entity::Thread);
        let containers = doc.containers.into_iter().map(Entity::Container);
        Ok(threads.chain(containers).collect())
    }

    /// Re-parent a thread or container.
    ///
    /// A non-null `parent_id` must resolve to an existing entity. Returns
    /// `None`, leaving the document untouched, if either ID fails to resolve.
    /// No cycle check is made.
    pub fn set_parent(&self, entity_id: &str, parent_id: Option<&str>) -> Result<Option<Entity>> {
        let mut doc = self.load()?;
        if let Some(parent_id) = parent_id {
            if doc.entity(parent_id).is_none() {
                return Ok(None);
            }
        }

        let parent = parent_id.map(str::to_string);
        let updated = if let Some(thread) = doc.thread_mut(entity_id) {
            thread.parent_id = parent;
            thread.touch();
            Entity::Thread(thread.clone())
        } else if let Some(container) = doc.container_mut(entity_id) {
            container.parent_id = parent;
            container.touch();
            Entity::Container(container.clone())
        } else {
            return Ok(None);
        };

        self.save(&doc)?;
        info!(entity_id, parent_id, "set parent");
        Ok(Some(updated))
    }

    /// Assign a thread or container to a group, or clear it with `None`.
    ///
    /// A non-null `group_id` must resolve to an existing group.
    pub fn move_to_group(&self, entity_id: &str, group_id: Option<&str>) -> Result<Option<Entity>> {
        let mut doc = self.load()?;
        if let Some(group_id) = group_id {
            if doc.group(group_id).is_none() {
                return Ok(None);
            }
        }

        let group = group_id.map(str::to_string);
        let updated = if let Some(thread) = doc.thread_mut(entity_id) {
            thread.group_id = group;
            thread.touch();
            Entity::Thread(thread.clone())
        } else if let Some(container) = doc.container_mut(entity_id) {
            container.group_id = group;
            container.touch();
            Entity::Container(container.clone())
        } else {
            return Ok(None);
        };

        self.save(&doc)?;
        info!(entity_id, group_id, "moved to group");
        Ok(Some(updated))
    }

    // === Hierarchy ===

    /// Direct children of `id`, containers before threads.
    pub fn get_children(&self, id: &str) -> Result<Vec<Entity>> {
        Ok(self.load()?.children_of(id))
    }

    /// Ancestors of `id`, nearest first.
    ///
    /// Stops at a root, at a parent reference that does not resolve, or when
    /// the chain loops back on itself.
    pub fn get_ancestors(&self, id: &str) -> Result<Vec<Entity>> {
        let doc = self.load()?;
        let mut ancestors = Vec::new();
        let Some(mut current) = doc.entity(id) else {
            return Ok(ancestors);
        };

        let mut seen = HashSet::from([id.to_string()]);
        while let Some(parent_id) = current.parent_id() {
            if !seen.insert(parent_id.to_string()) {
                warn!(id, parent_id, "cycle in parent chain");
                break;
            }
            let Some(parent) = doc.entity(parent_id) else {
                break;
            };
            ancestors.push(parent.clone());
            current = parent;
        }

        Ok(ancestors)
    }

    /// The tree rooted at `id`, or `None` if it does not resolve.
    pub fn get_subtree(&self, id: &str) -> Result<Option<TreeNode>> {
        let doc = self.load()?;
        Ok(doc
            .entity(id)
            .map(|entity| build_node(&doc, entity, &mut Vec::new())))
    }

    /// One tree per root entity (no parent), containers before threads at every level.
    ///
    /// Entities whose parent reference dangles are not roots and do not appear.
    pub fn get_full_tree(&self) -> Result<Vec<TreeNode>> {
        let doc = self.load()?;
        Ok(doc
            .roots()
            .into_iter()
            .map(|entity| build_node(&doc, entity, &mut Vec::new()))
            .collect())
    }
}

/// Recursively attach children; `path` holds the IDs from the root down to `entity`.
fn build_node(doc: &Document, entity: Entity, path: &mut Vec<String>) -> TreeNode {
    path.push(entity.id().to_string());
    let children = doc
        .children_of(entity.id())
        .into_iter()
        .filter(|child| !path.iter().any(|id| id == child.id()))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|child| build_node(doc, child, path))
        .collect();
    path.pop();
    TreeNode { entity, children }
}
