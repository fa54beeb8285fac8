//! MCP tool definitions and dispatch.
//!
//! Every tool takes a JSON object of camelCase arguments and returns a JSON
//! value. Lookups that miss surface as [`ToolError::NotFound`] so the server
//! can report them as `isError` results rather than protocol errors.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::models::{
    ContainerFilter, CreateContainerInput, CreateGroupInput, CreateThreadInput, Importance,
    Temperature, ThreadFilter, ThreadSize, ThreadStatus, UpdateContainerInput, UpdateGroupInput,
    UpdateThreadInput,
};
use crate::storage::Store;

/// Tool definition for the MCP manifest and `tools/list`.
#[derive(Debug, Clone)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolDef {
    fn new(name: &'static str, description: &'static str, input_schema: Value) -> Self {
        Self {
            name,
            description,
            input_schema,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

/// Reasons a tool call produced no result.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] crate::Error),
}

// ==================== Schemas ====================

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn nullable_string(description: &str) -> Value {
    json!({ "type": ["string", "null"], "description": description })
}

fn tags(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

fn status(description: &str) -> Value {
    let values: Vec<&str> = ThreadStatus::ALL.iter().map(|s| s.as_str()).collect();
    json!({ "type": "string", "enum": values, "description": description })
}

fn temperature(description: &str) -> Value {
    let values: Vec<&str> = Temperature::ALL.iter().map(|t| t.as_str()).collect();
    json!({ "type": "string", "enum": values, "description": description })
}

fn size(description: &str) -> Value {
    let values: Vec<&str> = ThreadSize::ALL.iter().map(|s| s.as_str()).collect();
    json!({ "type": "string", "enum": values, "description": description })
}

fn importance(description: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": Importance::MIN,
        "maximum": Importance::MAX,
        "description": description,
    })
}

fn identifier(what: &str) -> Value {
    object(
        json!({ "identifier": string(&format!("{} ID or name", what)) }),
        &["identifier"],
    )
}

fn entity_id(description: &str) -> Value {
    object(json!({ "entityId": string(description) }), &["entityId"])
}

fn by_id(description: &str) -> Value {
    object(json!({ "id": string(description) }), &["id"])
}

fn no_arguments() -> Value {
    object(json!({}), &[])
}

/// Get all available MCP tools.
pub fn get_tools() -> Vec<ToolDef> {
    vec![
        // Threads
        ToolDef::new(
            "create_thread",
            "Create a new thread for tracking an activity stream",
            object(
                json!({
                    "name": string("Thread name"),
                    "description": string("Brief thread description"),
                    "status": status("Initial status (default: active)"),
                    "temperature": temperature("Thread momentum (default: warm)"),
                    "size": size("Scope of work (default: medium)"),
                    "importance": importance("Priority level 1-5 (default: 3)"),
                    "parentId": string("Parent thread/container ID"),
                    "groupId": string("Group ID to assign to"),
                    "tags": tags("Tags for categorization"),
                }),
                &["name"],
            ),
        ),
        ToolDef::new(
            "update_thread",
            "Update properties of an existing thread",
            object(
                json!({
                    "id": string("Thread ID to update"),
                    "name": string("New name"),
                    "description": string("New description"),
                    "status": status("New status"),
                    "temperature": temperature("New temperature"),
                    "size": size("New size"),
                    "importance": importance("New importance"),
                    "parentId": nullable_string("New parent ID (null to make root)"),
                    "groupId": nullable_string("New group ID (null to remove from group)"),
                    "tags": tags("Replace tags array"),
                }),
                &["id"],
            ),
        ),
        ToolDef::new(
            "archive_thread",
            "Archive a thread (optionally with children)",
            object(
                json!({
                    "id": string("Thread ID to archive"),
                    "cascade": {
                        "type": "boolean",
                        "description": "Also archive direct child threads (default: false)",
                    },
                }),
                &["id"],
            ),
        ),
        ToolDef::new(
            "delete_thread",
            "Permanently delete a thread",
            by_id("Thread ID to delete"),
        ),
        ToolDef::new(
            "get_thread",
            "Get a single thread by ID or name",
            identifier("Thread"),
        ),
        // Progress
        ToolDef::new(
            "add_progress",
            "Add a progress note to a thread",
            object(
                json!({
                    "threadId": string("Thread ID to add progress to"),
                    "note": string("Progress note text"),
                    "timestamp": string("Custom timestamp (ISO 8601, default: now)"),
                }),
                &["threadId", "note"],
            ),
        ),
        ToolDef::new(
            "list_progress",
            "Get progress history for a thread",
            object(
                json!({
                    "threadId": string("Thread ID"),
                    "limit": {
                        "type": "integer",
                        "description": "Max entries to return, most recent first (0 or less: all)",
                    },
                }),
                &["threadId"],
            ),
        ),
        ToolDef::new(
            "edit_progress",
            "Edit an existing progress entry",
            object(
                json!({
                    "threadId": string("Thread ID"),
                    "progressId": string("Progress entry ID"),
                    "note": string("New note text"),
                }),
                &["threadId", "progressId", "note"],
            ),
        ),
        ToolDef::new(
            "delete_progress",
            "Delete a progress entry",
            object(
                json!({
                    "threadId": string("Thread ID"),
                    "progressId": string("Progress entry ID"),
                }),
                &["threadId", "progressId"],
            ),
        ),
        // Containers and groups
        ToolDef::new(
            "create_container",
            "Create a new container for organizing threads",
            object(
                json!({
                    "name": string("Container name"),
                    "description": string("Container description"),
                    "parentId": string("Parent container ID"),
                    "groupId": string("Group ID to assign to"),
                    "tags": tags("Tags for categorization"),
                }),
                &["name"],
            ),
        ),
        ToolDef::new(
            "update_container",
            "Update properties of a container",
            object(
                json!({
                    "id": string("Container ID"),
                    "name": string("New name"),
                    "description": string("New description"),
                    "parentId": nullable_string("New parent ID (null to make root)"),
                    "groupId": nullable_string("New group ID (null to remove from group)"),
                    "tags": tags("Replace tags array"),
                }),
                &["id"],
            ),
        ),
        ToolDef::new(
            "delete_container",
            "Delete a container",
            by_id("Container ID"),
        ),
        ToolDef::new(
            "create_group",
            "Create a new group for cross-cutting organization",
            object(
                json!({
                    "name": string("Group name"),
                    "description": string("Group description"),
                }),
                &["name"],
            ),
        ),
        ToolDef::new(
            "update_group",
            "Update properties of a group",
            object(
                json!({
                    "id": string("Group ID"),
                    "name": string("New name"),
                    "description": string("New description"),
                }),
                &["id"],
            ),
        ),
        ToolDef::new("delete_group", "Delete a group", by_id("Group ID")),
        // Hierarchy
        ToolDef::new(
            "set_parent",
            "Set the parent of a thread or container",
            object(
                json!({
                    "entityId": string("Thread or container ID"),
                    "parentId": nullable_string("New parent ID (null to make root)"),
                }),
                &["entityId", "parentId"],
            ),
        ),
        ToolDef::new(
            "move_to_group",
            "Move a thread or container to a group",
            object(
                json!({
                    "entityId": string("Thread or container ID"),
                    "groupId": nullable_string("Group ID (null to remove from group)"),
                }),
                &["entityId", "groupId"],
            ),
        ),
        ToolDef::new(
            "get_children",
            "Get immediate children of an entity",
            entity_id("Parent entity ID"),
        ),
        ToolDef::new(
            "get_ancestors",
            "Get all ancestors of an entity (path to root)",
            entity_id("Entity ID"),
        ),
        ToolDef::new(
            "get_subtree",
            "Get the full subtree rooted at an entity",
            entity_id("Root entity ID"),
        ),
        // Queries
        ToolDef::new(
            "list_threads",
            "List threads with optional filtering",
            object(
                json!({
                    "status": status("Filter by status"),
                    "temperature": temperature("Filter by temperature"),
                    "size": size("Filter by size"),
                    "importance": importance("Filter by importance"),
                    "groupId": string("Filter by group"),
                    "parentId": nullable_string("Filter by parent (null for root threads)"),
                    "tags": tags("Filter by any of these tags"),
                    "search": string("Search in name and description"),
                }),
                &[],
            ),
        ),
        ToolDef::new(
            "list_containers",
            "List containers with optional filtering",
            object(
                json!({
                    "groupId": string("Filter by group"),
                    "parentId": nullable_string("Filter by parent (null for root containers)"),
                    "tags": tags("Filter by any of these tags"),
                    "search": string("Search in name and description"),
                }),
                &[],
            ),
        ),
        ToolDef::new("list_groups", "List all groups", no_arguments()),
        ToolDef::new(
            "search_threads",
            "Search threads and containers by text query",
            object(json!({ "query": string("Search query") }), &["query"]),
        ),
        ToolDef::new(
            "get_next_action",
            "Suggest the next thread to work on based on priority",
            no_arguments(),
        ),
        ToolDef::new(
            "get_full_tree",
            "Get the complete hierarchy tree",
            no_arguments(),
        ),
        ToolDef::new(
            "get_entity",
            "Get any entity (thread or container) by ID or name",
            identifier("Entity"),
        ),
        ToolDef::new(
            "get_container",
            "Get a container by ID or name",
            identifier("Container"),
        ),
        ToolDef::new(
            "get_group",
            "Get a group by ID or name",
            identifier("Group"),
        ),
    ]
}

// ==================== Arguments ====================

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

#[derive(Deserialize)]
struct IdentifierArgs {
    identifier: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityArgs {
    entity_id: String,
}

#[derive(Deserialize)]
struct ArchiveArgs {
    id: String,
    #[serde(default)]
    cascade: bool,
}

#[derive(Deserialize)]
struct UpdateThreadArgs {
    id: String,
    #[serde(flatten)]
    changes: UpdateThreadInput,
}

#[derive(Deserialize)]
struct UpdateContainerArgs {
    id: String,
    #[serde(flatten)]
    changes: UpdateContainerInput,
}

#[derive(Deserialize)]
struct UpdateGroupArgs {
    id: String,
    #[serde(flatten)]
    changes: UpdateGroupInput,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddProgressArgs {
    thread_id: String,
    note: String,
    timestamp: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProgressArgs {
    thread_id: String,
    /// Zero or negative means no limit
    limit: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditProgressArgs {
    thread_id: String,
    progress_id: String,
    note: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProgressArgs {
    thread_id: String,
    progress_id: String,
}

/// `parentId` must be present but may be null.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetParentArgs {
    entity_id: String,
    #[serde(deserialize_with = "Option::deserialize")]
    parent_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveToGroupArgs {
    entity_id: String,
    #[serde(deserialize_with = "Option::deserialize")]
    group_id: Option<String>,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

/// Deserialize tool arguments; a missing `arguments` object counts as `{}`.
fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn found<T: serde::Serialize>(
    value: Option<T>,
    missing: impl FnOnce() -> String,
) -> Result<Value, ToolError> {
    match value {
        Some(value) => Ok(serde_json::to_value(value).map_err(crate::Error::from)?),
        None => Err(ToolError::NotFound(missing())),
    }
}

fn ok<T: serde::Serialize>(value: T) -> Result<Value, ToolError> {
    Ok(serde_json::to_value(value).map_err(crate::Error::from)?)
}

fn deleted(existed: bool, id: &str, what: &str) -> Result<Value, ToolError> {
    if existed {
        Ok(json!({ "deleted": true, "id": id }))
    } else {
        Err(ToolError::NotFound(format!("{} not found: {}", what, id)))
    }
}

// ==================== Dispatch ====================

/// Execute a tool against the store.
pub fn call_tool(store: &Store, name: &str, args: Value) -> Result<Value, ToolError> {
    match name {
        // Threads
        "create_thread" => ok(store.create_thread(parse::<CreateThreadInput>(args)?)?),
        "update_thread" => {
            let UpdateThreadArgs { id, changes } = parse(args)?;
            found(store.update_thread(&id, changes)?, || {
                format!("Thread not found: {}", id)
            })
        }
        "archive_thread" => {
            let ArchiveArgs { id, cascade } = parse(args)?;
            found(store.archive_thread(&id, cascade)?, || {
                format!("Thread not found: {}", id)
            })
        }
        "delete_thread" => {
            let IdArgs { id } = parse(args)?;
            deleted(store.delete_thread(&id)?, &id, "Thread")
        }
        "get_thread" => {
            let IdentifierArgs { identifier } = parse(args)?;
            found(store.find_thread(&identifier)?, || {
                format!("Thread not found: {}", identifier)
            })
        }

        // Progress
        "add_progress" => {
            let args: AddProgressArgs = parse(args)?;
            found(
                store.add_progress(&args.thread_id, &args.note, args.timestamp.as_deref())?,
                || format!("Thread not found: {}", args.thread_id),
            )
        }
        "list_progress" => {
            let args: ListProgressArgs = parse(args)?;
            let limit = args.limit.and_then(|n| usize::try_from(n).ok());
            ok(store.list_progress(&args.thread_id, limit)?)
        }
        "edit_progress" => {
            let args: EditProgressArgs = parse(args)?;
            found(
                store.edit_progress(&args.thread_id, &args.progress_id, &args.note)?,
                || "Progress entry not found".to_string(),
            )
        }
        "delete_progress" => {
            let args: DeleteProgressArgs = parse(args)?;
            if store.delete_progress(&args.thread_id, &args.progress_id)? {
                Ok(json!({ "deleted": true }))
            } else {
                Err(ToolError::NotFound("Progress entry not found".to_string()))
            }
        }

        // Containers and groups
        "create_container" => ok(store.create_container(parse::<CreateContainerInput>(args)?)?),
        "update_container" => {
            let UpdateContainerArgs { id, changes } = parse(args)?;
            found(store.update_container(&id, changes)?, || {
                format!("Container not found: {}", id)
            })
        }
        "delete_container" => {
            let IdArgs { id } = parse(args)?;
            deleted(store.delete_container(&id)?, &id, "Container")
        }
        "create_group" => ok(store.create_group(parse::<CreateGroupInput>(args)?)?),
        "update_group" => {
            let UpdateGroupArgs { id, changes } = parse(args)?;
            found(store.update_group(&id, changes)?, || {
                format!("Group not found: {}", id)
            })
        }
        "delete_group" => {
            let IdArgs { id } = parse(args)?;
            deleted(store.delete_group(&id)?, &id, "Group")
        }

        // Hierarchy
        "set_parent" => {
            let args: SetParentArgs = parse(args)?;
            found(
                store.set_parent(&args.entity_id, args.parent_id.as_deref())?,
                || "Entity or parent not found".to_string(),
            )
        }
        "move_to_group" => {
            let args: MoveToGroupArgs = parse(args)?;
            found(
                store.move_to_group(&args.entity_id, args.group_id.as_deref())?,
                || "Entity or group not found".to_string(),
            )
        }
        "get_children" => {
            let EntityArgs { entity_id } = parse(args)?;
            ok(store.get_children(&entity_id)?)
        }
        "get_ancestors" => {
            let EntityArgs { entity_id } = parse(args)?;
            ok(store.get_ancestors(&entity_id)?)
        }
        "get_subtree" => {
            let EntityArgs { entity_id } = parse(args)?;
            found(store.get_subtree(&entity_id)?, || {
                format!("Entity not found: {}", entity_id)
            })
        }

        // Queries
        "list_threads" => ok(store.list_threads(&parse::<ThreadFilter>(args)?)?),
        "list_containers" => ok(store.list_containers(&parse::<ContainerFilter>(args)?)?),
        "list_groups" => ok(store.list_groups()?),
        "search_threads" => {
            let SearchArgs { query } = parse(args)?;
            ok(store.search(&query)?)
        }
        "get_next_action" => ok(store.get_next_action()?),
        "get_full_tree" => ok(store.get_full_tree()?),
        "get_entity" => {
            let IdentifierArgs { identifier } = parse(args)?;
            found(store.find_entity(&identifier)?, || {
                format!("Entity not found: {}", identifier)
            })
        }
        "get_container" => {
            let IdentifierArgs { identifier } = parse(args)?;
            found(store.find_container(&identifier)?, || {
                format!("Container not found: {}", identifier)
            })
        }
        "get_group" => {
            let IdentifierArgs { identifier } = parse(args)?;
            found(store.find_group(&identifier)?, || {
                format!("Group not found: {}", identifier)
            })
        }

        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;
    use std::collections::HashSet;

    #[test]
    fn test_tool_names_are_unique_and_dispatchable() {
        let env = TestEnv::new();
        let store = env.store();
        let tools = get_tools();
        assert_eq!(tools.len(), 29);

        let names: HashSet<&str> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), tools.len());

        for tool in &tools {
            let result = call_tool(&store, tool.name, json!({}));
            assert!(
                !matches!(result, Err(ToolError::UnknownTool(_))),
                "{} is listed but not dispatched",
                tool.name
            );
        }
    }

    #[test]
    fn test_schemas_list_enum_values() {
        let tools = get_tools();
        let create = tools.iter().find(|t| t.name == "create_thread").unwrap();
        let schema = &create.input_schema;
        assert_eq!(schema["required"], json!(["name"]));
        assert_eq!(
            schema["properties"]["temperature"]["enum"],
            json!(["frozen", "freezing", "cold", "tepid", "warm", "hot"])
        );
        assert_eq!(schema["properties"]["importance"]["maximum"], json!(5));
    }

    #[test]
    fn test_create_then_get_by_name() {
        let env = TestEnv::new();
        let store = env.store();

        let created = call_tool(
            &store,
            "create_thread",
            json!({ "name": "Garden", "temperature": "hot", "importance": 4 }),
        )
        .unwrap();
        assert_eq!(created["temperature"], "hot");
        assert_eq!(created["type"], "thread");

        let fetched = call_tool(&store, "get_thread", json!({ "identifier": "garden" })).unwrap();
        assert_eq!(fetched["id"], created["id"]);
    }

    #[test]
    fn test_invalid_arguments() {
        let env = TestEnv::new();
        let store = env.store();

        let missing = call_tool(&store, "create_thread", json!({}));
        assert!(matches!(missing, Err(ToolError::InvalidArguments(_))));

        let out_of_range = call_tool(
            &store,
            "create_thread",
            json!({ "name": "x", "importance": 9 }),
        );
        assert!(matches!(out_of_range, Err(ToolError::InvalidArguments(_))));

        let no_parent_key = call_tool(&store, "set_parent", json!({ "entityId": "a" }));
        assert!(matches!(no_parent_key, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn test_update_thread_can_clear_group() {
        let env = TestEnv::new();
        let store = env.store();
        let thread = store
            .create_thread(CreateThreadInput {
                group_id: Some("g".to_string()),
                ..CreateThreadInput::new("Grouped")
            })
            .unwrap();

        let updated = call_tool(
            &store,
            "update_thread",
            json!({ "id": thread.id, "groupId": null, "status": "paused" }),
        )
        .unwrap();
        assert_eq!(updated["status"], "paused");
        assert!(updated.get("groupId").is_none_or(Value::is_null));
        assert_eq!(updated["name"], "Grouped");
    }

    #[test]
    fn test_not_found_messages() {
        let env = TestEnv::new();
        let store = env.store();

        let err = call_tool(&store, "delete_thread", json!({ "id": "nope" })).unwrap_err();
        assert_eq!(err.to_string(), "Thread not found: nope");

        let err = call_tool(
            &store,
            "set_parent",
            json!({ "entityId": "nope", "parentId": null }),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Entity or parent not found");

        let err = call_tool(&store, "frobnicate", json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: frobnicate");
    }

    #[test]
    fn test_next_action_is_null_when_empty() {
        let env = TestEnv::new();
        let next = call_tool(&env.store(), "get_next_action", Value::Null).unwrap();
        assert!(next.is_null());
    }

    #[test]
    fn test_progress_tools() {
        let env = TestEnv::new();
        let store = env.store();
        let thread = store.create_thread(CreateThreadInput::new("Run")).unwrap();

        let entry = call_tool(
            &store,
            "add_progress",
            json!({ "threadId": thread.id, "note": "5k", "timestamp": "2024-05-01T08:00:00Z" }),
        )
        .unwrap();
        assert_eq!(entry["timestamp"], "2024-05-01T08:00:00Z");

        let listed = call_tool(
            &store,
            "list_progress",
            json!({ "threadId": thread.id, "limit": 1 }),
        )
        .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        call_tool(&store, "add_progress", json!({ "threadId": thread.id, "note": "6k" })).unwrap();
        for limit in [0, -3] {
            let listed = call_tool(
                &store,
                "list_progress",
                json!({ "threadId": thread.id, "limit": limit }),
            )
            .unwrap();
            assert_eq!(listed.as_array().unwrap().len(), 2);
        }

        let removed = call_tool(
            &store,
            "delete_progress",
            json!({ "threadId": thread.id, "progressId": entry["id"] }),
        )
        .unwrap();
        assert_eq!(removed, json!({ "deleted": true }));
    }
}
