//! Data models for Threads entities.
//!
//! This module defines the core data structures:
//! - `Thread` - A unit of ongoing work with status, temperature, and a progress log
//! - `Container` - An organizational folder for threads and other containers
//! - `Group` - A flat, cross-cutting tag referenced by threads and containers
//! - `Entity` - Either a thread or a container, for hierarchy operations
//! - `Document` - The whole persisted store
//!
//! Field names serialize in camelCase so the file stays compatible with other
//! tools that read and write `threads.json`.

pub mod input;

pub use input::{
    ContainerFilter, CreateContainerInput, CreateGroupInput, CreateThreadInput, ThreadFilter,
    UpdateContainerInput, UpdateGroupInput, UpdateThreadInput,
};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Version written into freshly created documents.
pub const DOCUMENT_VERSION: &str = "1.0.0";

/// Current time as ISO-8601 UTC with millisecond precision.
///
/// Timestamps are kept as the strings found in the file so values written by
/// other tools (date-only, offsets, other precisions) load and save unchanged.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Lifecycle state of a thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    #[default]
    Active,
    Paused,
    Stopped,
    Completed,
    Archived,
}

impl ThreadStatus {
    pub const ALL: [ThreadStatus; 5] = [
        ThreadStatus::Active,
        ThreadStatus::Paused,
        ThreadStatus::Stopped,
        ThreadStatus::Completed,
        ThreadStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadStatus::Active => "active",
            ThreadStatus::Paused => "paused",
            ThreadStatus::Stopped => "stopped",
            ThreadStatus::Completed => "completed",
            ThreadStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Momentum of a thread, from coldest to hottest.
///
/// Variant order is significant: the derived `Ord` ranks `Hot` highest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Frozen,
    Freezing,
    Cold,
    Tepid,
    #[default]
    Warm,
    Hot,
}

impl Temperature {
    pub const ALL: [Temperature; 6] = [
        Temperature::Frozen,
        Temperature::Freezing,
        Temperature::Cold,
        Temperature::Tepid,
        Temperature::Warm,
        Temperature::Hot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Frozen => "frozen",
            Temperature::Freezing => "freezing",
            Temperature::Cold => "cold",
            Temperature::Tepid => "tepid",
            Temperature::Warm => "warm",
            Temperature::Hot => "hot",
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rough scope of the work in a thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadSize {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
}

impl ThreadSize {
    pub const ALL: [ThreadSize; 5] = [
        ThreadSize::Tiny,
        ThreadSize::Small,
        ThreadSize::Medium,
        ThreadSize::Large,
        ThreadSize::Huge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadSize::Tiny => "tiny",
            ThreadSize::Small => "small",
            ThreadSize::Medium => "medium",
            ThreadSize::Large => "large",
            ThreadSize::Huge => "huge",
        }
    }
}

impl fmt::Display for ThreadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of a thread, 1 (lowest) through 5 (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Importance(u8);

impl Importance {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns `None` when `value` is outside 1-5.
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Nearest valid importance to `value`, rounding fractions.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.round().clamp(f64::from(Self::MIN), f64::from(Self::MAX)) as u8)
    }
}

impl Default for Importance {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Importance {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("importance must be 1-5, got {}", value))
    }
}

impl From<Importance> for u8 {
    fn from(importance: Importance) -> Self {
        importance.0
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A timestamped note in a thread's progress log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: String,
    pub timestamp: String,
    pub note: String,
}

/// A free-form detail note attached to a thread or container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailsEntry {
    pub id: String,
    pub timestamp: String,
    pub content: String,
}

/// A dependency of one thread on another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub thread_id: String,
    #[serde(default)]
    pub why: String,
    #[serde(default)]
    pub what: String,
    #[serde(default)]
    pub how: String,
    #[serde(default)]
    pub when: String,
}

fn thread_type() -> String {
    "thread".to_string()
}

fn container_type() -> String {
    "container".to_string()
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

/// Treat an explicit `null` the same as a missing field.
///
/// Older records may carry `"tags": null`; loading normalizes them to the
/// type's default so callers never see an absent value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Load a stored importance, clamping values outside 1-5.
///
/// Tool input is range-checked through `Importance`'s own deserializer; stored
/// records written elsewhere may not be, and must not fail the whole document.
fn lenient_importance<'de, D>(deserializer: D) -> Result<Importance, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?
        .map(Importance::clamped)
        .unwrap_or_default())
}

/// A unit of ongoing work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Entity type marker; absent on records written before containers existed
    #[serde(rename = "type", default = "thread_type")]
    pub entity_type: String,

    pub id: String,

    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default)]
    pub status: ThreadStatus,

    #[serde(default, deserialize_with = "lenient_importance")]
    pub importance: Importance,

    #[serde(default)]
    pub temperature: Temperature,

    #[serde(default)]
    pub size: ThreadSize,

    /// Parent thread or container ID
    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub group_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<Dependency>,

    /// Progress log in append (chronological) order
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: Vec<ProgressEntry>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Vec<DetailsEntry>,

    pub created_at: String,

    pub updated_at: String,

    /// Fields written by other tools, preserved on rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Thread {
    /// Create a new thread with the given ID and name and default attributes.
    pub fn new(id: String, name: String) -> Self {
        let now = now_timestamp();
        Self {
            entity_type: thread_type(),
            id,
            name,
            description: String::new(),
            status: ThreadStatus::default(),
            importance: Importance::default(),
            temperature: Temperature::default(),
            size: ThreadSize::default(),
            parent_id: None,
            group_id: None,
            tags: Vec::new(),
            dependencies: Vec::new(),
            progress: Vec::new(),
            details: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            extra: Map::new(),
        }
    }

    /// Refresh `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

/// A pure organizational node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(rename = "type", default = "container_type")]
    pub entity_type: String,

    pub id: String,

    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub group_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Vec<DetailsEntry>,

    pub created_at: String,

    pub updated_at: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Container {
    /// Create a new container with the given ID and name.
    pub fn new(id: String, name: String) -> Self {
        let now = now_timestamp();
        Self {
            entity_type: container_type(),
            id,
            name,
            description: String::new(),
            parent_id: None,
            group_id: None,
            tags: Vec::new(),
            details: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            extra: Map::new(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

/// A flat, cross-cutting label for threads and containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,

    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    pub created_at: String,

    pub updated_at: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    /// Create a new group with the given ID and name.
    pub fn new(id: String, name: String) -> Self {
        let now = now_timestamp();
        Self {
            id,
            name,
            description: String::new(),
            created_at: now.clone(),
            updated_at: now,
            extra: Map::new(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

/// Either kind of node in the hierarchy.
///
/// Serializes as the inner record, whose `type` field carries the discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Container(Container),
    Thread(Thread),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Container(c) => &c.id,
            Entity::Thread(t) => &t.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Container(c) => &c.name,
            Entity::Thread(t) => &t.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Entity::Container(c) => &c.description,
            Entity::Thread(t) => &t.description,
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Entity::Container(c) => c.parent_id.as_deref(),
            Entity::Thread(t) => t.parent_id.as_deref(),
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        match self {
            Entity::Container(c) => c.group_id.as_deref(),
            Entity::Thread(t) => t.group_id.as_deref(),
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Entity::Container(c) => &c.tags,
            Entity::Thread(t) => &t.tags,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Entity::Container(_))
    }

    pub fn as_thread(&self) -> Option<&Thread> {
        match self {
            Entity::Thread(t) => Some(t),
            Entity::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Entity::Container(c) => Some(c),
            Entity::Thread(_) => None,
        }
    }

    /// Short type label for display ("thread" or "container").
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Container(_) => "container",
            Entity::Thread(_) => "thread",
        }
    }
}

impl From<Thread> for Entity {
    fn from(thread: Thread) -> Self {
        Entity::Thread(thread)
    }
}

impl From<Container> for Entity {
    fn from(container: Container) -> Self {
        Entity::Container(container)
    }
}

/// A node of the hierarchy with its children resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub entity: Entity,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Total number of nodes in this subtree, including the root.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// The full persisted state.
///
/// `Default` produces the document written when no data file exists yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "null_as_default")]
    pub threads: Vec<Thread>,

    /// Absent in documents written before containers existed
    #[serde(default, deserialize_with = "null_as_default")]
    pub containers: Vec<Container>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<Group>,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            threads: Vec::new(),
            containers: Vec::new(),
            groups: Vec::new(),
            version: default_version(),
            extra: Map::new(),
        }
    }
}

impl Document {
    pub fn thread(&self, id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn thread_mut(&mut self, id: &str) -> Option<&mut Thread> {
        self.threads.iter_mut().find(|t| t.id == id)
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn container_mut(&mut self, id: &str) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Case-insensitive exact name match; the first match wins.
    pub fn thread_by_name(&self, name: &str) -> Option<&Thread> {
        let lower = name.to_lowercase();
        self.threads.iter().find(|t| t.name.to_lowercase() == lower)
    }

    pub fn container_by_name(&self, name: &str) -> Option<&Container> {
        let lower = name.to_lowercase();
        self.containers
            .iter()
            .find(|c| c.name.to_lowercase() == lower)
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        let lower = name.to_lowercase();
        self.groups.iter().find(|g| g.name.to_lowercase() == lower)
    }

    /// Resolve an ID to a thread or container, threads first.
    pub fn entity(&self, id: &str) -> Option<Entity> {
        self.thread(id)
            .cloned()
            .map(Entity::Thread)
            .or_else(|| self.container(id).cloned().map(Entity::Container))
    }

    /// Direct children of `id`: containers first, then threads, each in document order.
    pub fn children_of(&self, id: &str) -> Vec<Entity> {
        let containers = self
            .containers
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(id))
            .cloned()
            .map(Entity::Container);
        let threads = self
            .threads
            .iter()
            .filter(|t| t.parent_id.as_deref() == Some(id))
            .cloned()
            .map(Entity::Thread);
        containers.chain(threads).collect()
    }

    /// Entities with no parent: containers first, then threads.
    pub fn roots(&self) -> Vec<Entity> {
        let containers = self
            .containers
            .iter()
            .filter(|c| c.parent_id.is_none())
            .cloned()
            .map(Entity::Container);
        let threads = self
            .threads
            .iter()
            .filter(|t| t.parent_id.is_none())
            .cloned()
            .map(Entity::Thread);
        containers.chain(threads).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_ordering() {
        assert!(Temperature::Hot > Temperature::Warm);
        assert!(Temperature::Warm > Temperature::Tepid);
        assert!(Temperature::Tepid > Temperature::Cold);
        assert!(Temperature::Cold > Temperature::Freezing);
        assert!(Temperature::Freezing > Temperature::Frozen);
    }

    #[test]
    fn test_importance_bounds() {
        assert!(Importance::new(0).is_none());
        assert!(Importance::new(6).is_none());
        assert_eq!(Importance::new(5).map(Importance::get), Some(5));
        assert_eq!(Importance::default().get(), 3);
    }

    #[test]
    fn test_importance_rejects_out_of_range_json() {
        let result: Result<Importance, _> = serde_json::from_str("9");
        assert!(result.is_err());
    }

    #[test]
    fn test_stored_importance_is_clamped() {
        let load = |importance: &str| -> u8 {
            let json = format!(
                r#"{{"id": "t1", "name": "T", "importance": {},
                    "createdAt": "2024-01-01", "updatedAt": "2024-01-01"}}"#,
                importance
            );
            serde_json::from_str::<Thread>(&json).unwrap().importance.get()
        };
        assert_eq!(load("7"), 5);
        assert_eq!(load("0"), 1);
        assert_eq!(load("-2"), 1);
        assert_eq!(load("2.6"), 3);
        assert_eq!(load("null"), 3);
    }

    #[test]
    fn test_timestamps_keep_their_text() {
        let json = r#"{
            "id": "t1",
            "name": "T",
            "progress": [{ "id": "p1", "timestamp": "2024-03-01", "note": "n" }],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00+02:00"
        }"#;
        let thread: Thread = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&thread).unwrap();

        assert_eq!(back["progress"][0]["timestamp"], "2024-03-01");
        assert_eq!(back["createdAt"], "2024-01-01T00:00:00.000Z");
        assert_eq!(back["updatedAt"], "2024-01-01T00:00:00+02:00");
    }

    #[test]
    fn test_now_timestamp_has_millisecond_precision() {
        let now = now_timestamp();
        assert_eq!(now.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(now.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }

    #[test]
    fn test_thread_serializes_camel_case() {
        let mut thread = Thread::new("t1".to_string(), "Write docs".to_string());
        thread.parent_id = Some("c1".to_string());
        let json = serde_json::to_value(&thread).unwrap();

        assert_eq!(json["type"], "thread");
        assert_eq!(json["parentId"], "c1");
        assert_eq!(json["groupId"], Value::Null);
        assert_eq!(json["temperature"], "warm");
        assert_eq!(json["importance"], 3);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("entity_type").is_none());
    }

    #[test]
    fn test_legacy_thread_record_gets_defaults() {
        let json = r#"{
            "id": "t1",
            "name": "Old thread",
            "status": "paused",
            "importance": 4,
            "temperature": "cold",
            "size": "small",
            "parentId": null,
            "groupId": null,
            "tags": null,
            "dependencies": [],
            "progress": [],
            "details": [],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }"#;
        let thread: Thread = serde_json::from_str(json).unwrap();

        assert_eq!(thread.entity_type, "thread");
        assert_eq!(thread.description, "");
        assert!(thread.tags.is_empty());
        assert_eq!(thread.status, ThreadStatus::Paused);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let json = r#"{
            "type": "container",
            "id": "c1",
            "name": "Work",
            "color": "blue",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }"#;
        let container: Container = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&container).unwrap();

        assert_eq!(back["color"], "blue");
        assert_eq!(back["type"], "container");
    }

    #[test]
    fn test_entity_serializes_untagged() {
        let entity = Entity::from(Container::new("c1".to_string(), "Work".to_string()));
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "container");
        assert_eq!(json["name"], "Work");
    }

    #[test]
    fn test_children_of_lists_containers_first() {
        let mut doc = Document::default();
        let mut thread = Thread::new("t1".to_string(), "Task".to_string());
        thread.parent_id = Some("root".to_string());
        let mut container = Container::new("c1".to_string(), "Sub".to_string());
        container.parent_id = Some("root".to_string());
        doc.threads.push(thread);
        doc.containers.push(container);

        let children = doc.children_of("root");
        let ids: Vec<&str> = children.iter().map(Entity::id).collect();
        assert_eq!(ids, vec!["c1", "t1"]);
    }
}
