//! Filtered listing, free-text search, and next-action selection.

use super::Store;
use crate::Result;
use crate::models::{
    Container, ContainerFilter, Entity, Temperature, Thread, ThreadFilter, ThreadStatus,
};

impl Store {
    /// List threads matching every provided filter field.
    pub fn list_threads(&self, filter: &ThreadFilter) -> Result<Vec<Thread>> {
        let doc = self.load()?;
        Ok(doc
            .threads
            .into_iter()
            .filter(|t| thread_matches(t, filter))
            .collect())
    }

    /// List containers matching every provided filter field.
    pub fn list_containers(&self, filter: &ContainerFilter) -> Result<Vec<Container>> {
        let doc = self.load()?;
        Ok(doc
            .containers
            .into_iter()
            .filter(|c| container_matches(c, filter))
            .collect())
    }

    /// Case-insensitive substring search over name, description and tags.
    ///
    /// Matching containers come before matching threads.
    pub fn search(&self, query: &str) -> Result<Vec<Entity>> {
        let doc = self.load()?;
        let needle = query.to_lowercase();

        let containers = doc
            .containers
            .into_iter()
            .filter(|c| {
                text_matches(&c.name, &c.description, &needle)
                    || tag_matches(&c.tags, &needle)
            })
            .map(Entity::Container);
        let threads = doc
            .threads
            .into_iter()
            .filter(|t| {
                text_matches(&t.name, &t.description, &needle)
                    || tag_matches(&t.tags, &needle)
            })
            .map(Entity::Thread);

        Ok(containers.chain(threads).collect())
    }

    /// The active thread to work on next.
    ///
    /// Highest temperature wins, then highest importance; on a full tie the
    /// thread that comes first in the document is kept.
    pub fn get_next_action(&self) -> Result<Option<Thread>> {
        let active = self.list_threads(&ThreadFilter::with_status(ThreadStatus::Active))?;
        Ok(active.into_iter().reduce(|best, candidate| {
            if priority(&candidate) > priority(&best) {
                candidate
            } else {
                best
            }
        }))
    }

    /// Containers then threads assigned to `group_id`.
    pub fn group_members(&self, group_id: &str) -> Result<Vec<Entity>> {
        let doc = self.load()?;
        let containers = doc
            .containers
            .into_iter()
            .filter(|c| c.group_id.as_deref() == Some(group_id))
            .map(Entity::Container);
        let threads = doc
            .threads
            .into_iter()
            .filter(|t| t.group_id.as_deref() == Some(group_id))
            .map(Entity::Thread);
        Ok(containers.chain(threads).collect())
    }

    /// Threads running hot or warm.
    pub fn hot_threads(&self) -> Result<Vec<Thread>> {
        let doc = self.load()?;
        Ok(doc
            .threads
            .into_iter()
            .filter(|t| t.temperature >= Temperature::Warm)
            .collect())
    }
}

fn priority(thread: &Thread) -> (Temperature, u8) {
    (thread.temperature, thread.importance.get())
}

fn thread_matches(thread: &Thread, filter: &ThreadFilter) -> bool {
    if filter.status.is_some_and(|s| thread.status != s) {
        return false;
    }
    if filter.temperature.is_some_and(|t| thread.temperature != t) {
        return false;
    }
    if filter.size.is_some_and(|s| thread.size != s) {
        return false;
    }
    if filter.importance.is_some_and(|i| thread.importance != i) {
        return false;
    }
    relation_matches(
        thread.group_id.as_deref(),
        thread.parent_id.as_deref(),
        &thread.tags,
        &thread.name,
        &thread.description,
        filter.group_id.as_deref(),
        filter.parent_id.as_ref(),
        filter.tags.as_deref(),
        filter.search.as_deref(),
    )
}

fn container_matches(container: &Container, filter: &ContainerFilter) -> bool {
    relation_matches(
        container.group_id.as_deref(),
        container.parent_id.as_deref(),
        &container.tags,
        &container.name,
        &container.description,
        filter.group_id.as_deref(),
        filter.parent_id.as_ref(),
        filter.tags.as_deref(),
        filter.search.as_deref(),
    )
}

/// Filter fields shared by threads and containers.
#[allow(clippy::too_many_arguments)]
fn relation_matches(
    group_id: Option<&str>,
    parent_id: Option<&str>,
    tags: &[String],
    name: &str,
    description: &str,
    want_group: Option<&str>,
    want_parent: Option<&Option<String>>,
    want_tags: Option<&[String]>,
    search: Option<&str>,
) -> bool {
    if want_group.is_some_and(|g| group_id != Some(g)) {
        return false;
    }
    if want_parent.is_some_and(|p| parent_id != p.as_deref()) {
        return false;
    }
    if let Some(want_tags) = want_tags {
        if !want_tags.is_empty() && !want_tags.iter().any(|tag| tags.contains(tag)) {
            return false;
        }
    }
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        if !text_matches(name, description, &search.to_lowercase()) {
            return false;
        }
    }
    true
}

/// `needle` must already be lowercase.
fn text_matches(name: &str, description: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle) || description.to_lowercase().contains(needle)
}

fn tag_matches(tags: &[String], needle: &str) -> bool {
    tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}
