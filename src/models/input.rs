//! Input and filter types accepted by store operations.
//!
//! These deserialize directly from MCP tool arguments (camelCase keys).
//! Nullable relation fields use `Option<Option<String>>` so that "not given"
//! and "explicitly null" stay distinct.

use serde::{Deserialize, Deserializer};

use super::{Importance, Temperature, ThreadSize, ThreadStatus};

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Combined with `#[serde(default)]`, a missing field stays `None`.
fn explicit<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Fields for a new thread. Only `name` is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadInput {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ThreadStatus>,
    pub temperature: Option<Temperature>,
    pub size: Option<ThreadSize>,
    pub importance: Option<Importance>,
    pub parent_id: Option<String>,
    pub group_id: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl CreateThreadInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a thread; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateThreadInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ThreadStatus>,
    pub temperature: Option<Temperature>,
    pub size: Option<ThreadSize>,
    pub importance: Option<Importance>,
    #[serde(default, deserialize_with = "explicit")]
    pub parent_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    pub group_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// Fields for a new container. Only `name` is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContainerInput {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub group_id: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl CreateContainerInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContainerInput {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub parent_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    pub group_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    pub name: String,
    pub description: Option<String>,
}

impl CreateGroupInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Conjunctive filter over threads.
///
/// `parent_id: Some(None)` selects root threads; `tags` matches any of the given tags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadFilter {
    pub status: Option<ThreadStatus>,
    pub temperature: Option<Temperature>,
    pub size: Option<ThreadSize>,
    pub importance: Option<Importance>,
    pub group_id: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub parent_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub search: Option<String>,
}

impl ThreadFilter {
    pub fn with_status(status: ThreadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Conjunctive filter over containers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerFilter {
    pub group_id: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub parent_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub search: Option<String>,
}
