//! JSON shapes exchanged with the backend endpoint.
//!
//! Decoding is lenient: a malformed field falls back to a default instead of
//! failing the whole response, and malformed list entries are skipped.

use serde::Serialize;
use serde_json::{Map, Value};
use taskdeck_core::{HexColor, Priority, Tag, Task, TaskId};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing::warn;

use crate::error::BackendError;

/// Request body; `action` selects the backend operation.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request<'a> {
    /// Fetch every task.
    GetTasks,
    /// Fetch every tag.
    GetTags,
    /// Create a task; the backend assigns the id.
    AddTask(TaskPayload<'a>),
    /// Replace a task by id.
    UpdateTask(TaskPayload<'a>),
    /// Delete a task by id.
    DeleteTask {
        /// Target task.
        id: TaskId,
    },
    /// Create a tag.
    AddTag {
        /// Tag name.
        name: &'a str,
        /// Tag color.
        color: HexColor,
    },
    /// Delete a tag by name.
    DeleteTag {
        /// Tag name.
        name: &'a str,
    },
}

impl Request<'_> {
    /// Wire name of the action, for logging.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::GetTasks => "getTasks",
            Self::GetTags => "getTags",
            Self::AddTask(_) => "addTask",
            Self::UpdateTask(_) => "updateTask",
            Self::DeleteTask { .. } => "deleteTask",
            Self::AddTag { .. } => "addTag",
            Self::DeleteTag { .. } => "deleteTag",
        }
    }
}

/// Task fields sent on create and update.
#[derive(Debug, Serialize)]
pub struct TaskPayload<'a> {
    /// Present only for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    /// Title.
    pub title: &'a str,
    /// Description.
    pub description: &'a str,
    /// Completion flag.
    pub is_completed: bool,
    /// Priority wire value.
    pub priority: &'a str,
    /// Due date as RFC 3339, or null.
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Tag names.
    pub tags: &'a [String],
}

impl<'a> TaskPayload<'a> {
    /// Payload for a new task. Any local id is dropped.
    #[must_use]
    pub fn insert(task: &'a Task) -> Self {
        Self {
            id: None,
            ..Self::replace(task)
        }
    }

    /// Payload for a full replacement of an existing task.
    #[must_use]
    pub fn replace(task: &'a Task) -> Self {
        Self {
            id: task.id,
            title: &task.title,
            description: &task.description,
            is_completed: task.is_completed,
            priority: task.priority.as_str(),
            due_date: task.due_date,
            tags: &task.tags,
        }
    }
}

/// Decoded `{success, message?, ...payload}` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseEnvelope {
    /// Whether the backend accepted the request.
    pub success: bool,
    /// Optional human-readable reason.
    pub message: Option<String>,
    /// Remaining top-level fields.
    pub payload: Map<String, Value>,
}

impl ResponseEnvelope {
    /// Split a JSON body into envelope fields.
    ///
    /// # Errors
    /// Returns [`BackendError::Decode`] when the body is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, BackendError> {
        let Value::Object(mut payload) = value else {
            return Err(BackendError::Decode("expected a JSON object".into()));
        };
        let success = payload
            .remove("success")
            .as_ref()
            .and_then(lenient_bool)
            .unwrap_or(false);
        let message = match payload.remove("message") {
            Some(Value::String(text)) => Some(text),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        Ok(Self {
            success,
            message,
            payload,
        })
    }

    /// Turn `success: false` into [`BackendError::Rejected`].
    ///
    /// # Errors
    /// Returns the rejection when the backend reported failure.
    pub fn into_result(self) -> Result<Self, BackendError> {
        if self.success {
            Ok(self)
        } else {
            Err(BackendError::Rejected {
                message: self.message,
            })
        }
    }

    /// Tasks listed under `tasks`. `now` stands in for unparsable creation times.
    #[must_use]
    pub fn tasks(&self, now: OffsetDateTime) -> Vec<Task> {
        list_entries(&self.payload, "tasks")
            .iter()
            .filter_map(|value| {
                let task = decode_task(value, now);
                if task.is_none() {
                    warn!(entry = %value, "Skipping malformed task entry");
                }
                task
            })
            .collect()
    }

    /// Tags listed under `tags`.
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        list_entries(&self.payload, "tags")
            .iter()
            .filter_map(|value| {
                let tag = decode_tag(value);
                if tag.is_none() {
                    warn!(entry = %value, "Skipping malformed tag entry");
                }
                tag
            })
            .collect()
    }
}

fn list_entries<'a>(payload: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Decode one task object. Returns `None` only when `value` is not an object.
#[must_use]
pub fn decode_task(value: &Value, now: OffsetDateTime) -> Option<Task> {
    let object = value.as_object()?;
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_default()
    };
    let tags = object
        .get("tags")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Some(Task {
        id: object.get("id").and_then(lenient_id),
        title: text("title"),
        description: text("description"),
        is_completed: object
            .get("is_completed")
            .and_then(lenient_bool)
            .unwrap_or(false),
        priority: object
            .get("priority")
            .and_then(Value::as_str)
            .map(Priority::from)
            .unwrap_or_default(),
        created_at: object
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .unwrap_or(now),
        due_date: object
            .get("due_date")
            .and_then(Value::as_str)
            .and_then(parse_timestamp),
        tags,
    })
}

/// Decode one tag object. Entries without a usable name are rejected.
#[must_use]
pub fn decode_tag(value: &Value) -> Option<Tag> {
    let object = value.as_object()?;
    let name = object.get("name").and_then(Value::as_str)?;
    if name.is_empty() {
        return None;
    }
    let color = object
        .get("color")
        .and_then(Value::as_str)
        .map_or(HexColor::NEUTRAL, HexColor::parse_lossy);
    Some(Tag::new(name, color))
}

/// Parse the timestamp formats the backend is known to emit.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS` (with
/// optional fractional seconds, read as UTC), and bare `YYYY-MM-DD` (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    if let Some(naive) = parse_naive(raw) {
        return Some(naive.assume_utc());
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

fn parse_naive(raw: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            raw,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            raw,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            raw,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
    })
    .ok()
}

fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Some(true),
            "0" | "false" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn lenient_id(value: &Value) -> Option<TaskId> {
    match value {
        Value::Number(number) => number.as_i64().map(TaskId),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}
