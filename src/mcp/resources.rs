//! MCP resources under the `threads://` scheme.
//!
//! | URI                               | Contents                              |
//! |-----------------------------------|---------------------------------------|
//! | `threads://threads/list`          | every thread                          |
//! | `threads://threads/active`        | threads with status `active`          |
//! | `threads://threads/hot`           | threads running hot or warm           |
//! | `threads://threads/{id-or-name}`  | one thread                            |
//! | `threads://containers/list`       | every container                       |
//! | `threads://containers/{id-or-name}` | one container                       |
//! | `threads://groups/list`           | every group                           |
//! | `threads://groups/{id-or-name}`   | one group                             |
//! | `threads://groups/{id}/members`   | containers then threads in the group  |
//! | `threads://tree`                  | the full hierarchy                    |
//! | `threads://next`                  | the suggested next thread (or `null`) |
//! | `threads://progress/{threadId}`   | a thread's progress, newest first     |

use serde::Serialize;

use crate::models::{ContainerFilter, ThreadFilter, ThreadStatus};
use crate::storage::Store;

pub const SCHEME: &str = "threads://";

const MIME_JSON: &str = "application/json";

/// JSON-RPC error code for a URI that names no known resource kind.
pub const INVALID_URI: i64 = -32602;

/// JSON-RPC error code for a well-formed URI whose target does not exist.
pub const RESOURCE_NOT_FOUND: i64 = -32002;

/// JSON-RPC error code for storage failures while reading.
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDef {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: &'static str,
}

impl ResourceDef {
    fn new(uri: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: description.into(),
            mime_type: MIME_JSON,
        }
    }
}

/// Text contents returned by `resources/read`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: &'static str,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] crate::Error),
}

impl ResourceError {
    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i64 {
        match self {
            ResourceError::InvalidUri(_) => INVALID_URI,
            ResourceError::NotFound(_) => RESOURCE_NOT_FOUND,
            ResourceError::Store(_) => INTERNAL_ERROR,
        }
    }
}

/// Resources that exist regardless of what the store holds.
pub fn static_resources() -> Vec<ResourceDef> {
    vec![
        ResourceDef::new(
            "threads://threads/list",
            "All Threads",
            "List of all threads in the system",
        ),
        ResourceDef::new(
            "threads://threads/active",
            "Active Threads",
            "Threads with active status",
        ),
        ResourceDef::new(
            "threads://threads/hot",
            "Hot Threads",
            "Threads with hot or warm temperature",
        ),
        ResourceDef::new(
            "threads://containers/list",
            "All Containers",
            "List of all containers in the system",
        ),
        ResourceDef::new(
            "threads://groups/list",
            "All Groups",
            "List of all groups in the system",
        ),
        ResourceDef::new(
            "threads://tree",
            "Full Hierarchy Tree",
            "Complete hierarchy of all threads and containers",
        ),
        ResourceDef::new(
            "threads://next",
            "Next Action",
            "Suggested next thread to work on",
        ),
    ]
}

fn or_fallback(description: &str, kind: &str, name: &str) -> String {
    if description.is_empty() {
        format!("{}: {}", kind, name)
    } else {
        description.to_string()
    }
}

/// Static resources plus one entry per stored entity.
pub fn list_resources(store: &Store) -> crate::Result<Vec<ResourceDef>> {
    let doc = store.load()?;
    let mut resources = static_resources();

    for thread in &doc.threads {
        resources.push(ResourceDef::new(
            format!("{}threads/{}", SCHEME, thread.id),
            thread.name.clone(),
            or_fallback(&thread.description, "Thread", &thread.name),
        ));
    }
    for container in &doc.containers {
        resources.push(ResourceDef::new(
            format!("{}containers/{}", SCHEME, container.id),
            container.name.clone(),
            or_fallback(&container.description, "Container", &container.name),
        ));
    }
    for group in &doc.groups {
        resources.push(ResourceDef::new(
            format!("{}groups/{}", SCHEME, group.id),
            group.name.clone(),
            or_fallback(&group.description, "Group", &group.name),
        ));
        resources.push(ResourceDef::new(
            format!("{}groups/{}/members", SCHEME, group.id),
            format!("{} - Members", group.name),
            format!("Threads and containers in group: {}", group.name),
        ));
    }
    for thread in doc.threads.iter().filter(|t| !t.progress.is_empty()) {
        resources.push(ResourceDef::new(
            format!("{}progress/{}", SCHEME, thread.id),
            format!("Progress: {}", thread.name),
            format!("Progress log for thread: {}", thread.name),
        ));
    }

    Ok(resources)
}

/// Resolve a `threads://` URI to its JSON contents.
pub fn read_resource(store: &Store, uri: &str) -> Result<ResourceContents, ResourceError> {
    let path = uri
        .strip_prefix(SCHEME)
        .ok_or_else(|| ResourceError::InvalidUri(uri.to_string()))?;
    let (kind, rest) = path.split_once('/').unwrap_or((path, ""));
    let not_found = || ResourceError::NotFound(uri.to_string());

    let data = match (kind, rest) {
        ("threads", "list") => pretty(store.list_threads(&ThreadFilter::default())?)?,
        ("threads", "active") => {
            pretty(store.list_threads(&ThreadFilter::with_status(ThreadStatus::Active))?)?
        }
        ("threads", "hot") => pretty(store.hot_threads()?)?,
        ("threads", identifier) => {
            let identifier = first_segment(identifier);
            pretty(store.find_thread(identifier)?.ok_or_else(not_found)?)?
        }
        ("containers", "list") => pretty(store.list_containers(&ContainerFilter::default())?)?,
        ("containers", identifier) => {
            let identifier = first_segment(identifier);
            pretty(store.find_container(identifier)?.ok_or_else(not_found)?)?
        }
        ("groups", "list") => pretty(store.list_groups()?)?,
        ("groups", rest) => match rest.split_once('/') {
            Some((group_id, "members")) => pretty(store.group_members(group_id)?)?,
            _ => {
                let identifier = first_segment(rest);
                pretty(store.find_group(identifier)?.ok_or_else(not_found)?)?
            }
        },
        ("tree", "") => pretty(store.get_full_tree()?)?,
        ("next", "") => pretty(store.get_next_action()?)?,
        ("progress", thread_id) if !thread_id.is_empty() => {
            let progress = store.list_progress(thread_id, None)?;
            if progress.is_empty() {
                return Err(not_found());
            }
            pretty(progress)?
        }
        _ => return Err(ResourceError::InvalidUri(uri.to_string())),
    };

    Ok(ResourceContents {
        uri: uri.to_string(),
        mime_type: MIME_JSON,
        text: data,
    })
}

fn first_segment(rest: &str) -> &str {
    rest.split('/').next().unwrap_or(rest)
}

fn pretty<T: Serialize>(value: T) -> Result<String, ResourceError> {
    serde_json::to_string_pretty(&value).map_err(|e| ResourceError::Store(e.into()))
}
