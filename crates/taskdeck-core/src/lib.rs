//! Domain types & query logic for taskdeck.

/// Tag colors and palette table.
pub mod color;
/// Named filter selectors.
pub mod filter;
/// Identifier types.
pub mod id;
/// Deterministic task ordering.
pub mod order;
/// Task priority.
pub mod priority;
/// Free-text query language.
pub mod query;
/// Input checks performed before any backend call.
pub mod validate;

pub use crate::color::{HexColor, PaletteEntry, TagPalette, resolve_tag_color};
pub use crate::filter::{NamedFilter, select_by_filter};
pub use crate::id::TaskId;
pub use crate::order::{compare_tasks, sort_tasks};
pub use crate::priority::Priority;
pub use crate::query::{TaskQuery, filter_by_query, parse_query};
pub use crate::validate::{ValidationError, validate_tag_name, validate_title};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A task as held in memory by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Backend identity; `None` until the backend has confirmed the task.
    pub id: Option<TaskId>,
    /// Display title.
    pub title: String,
    /// Free-form description, possibly empty.
    pub description: String,
    /// Completion flag.
    pub is_completed: bool,
    /// Priority value.
    pub priority: Priority,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Optional due timestamp.
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Tag names in backend order. Names may refer to tags that no longer exist.
    pub tags: Vec<String>,
}

impl Task {
    /// Create an incomplete, unsaved task with medium priority.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            is_completed: false,
            priority: Priority::default(),
            created_at: OffsetDateTime::now_utc(),
            due_date: None,
            tags: Vec::new(),
        }
    }

    /// Set the identity.
    #[must_use]
    pub const fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Set the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due: Option<OffsetDateTime>) -> Self {
        self.due_date = due;
        self
    }

    /// Replace the tag list.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the completion flag.
    #[must_use]
    pub const fn completed(mut self, done: bool) -> Self {
        self.is_completed = done;
        self
    }

    /// Derived status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        if self.is_completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }

    /// Exact, case-sensitive tag membership.
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag == name)
    }

    /// True when the task is pending and its due date is before `now`.
    #[must_use]
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        !self.is_completed && self.due_date.is_some_and(|due| due < now)
    }
}

/// Completion status derived from [`Task::is_completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Not yet completed.
    Pending,
    /// Completed.
    Completed,
}

impl TaskStatus {
    /// Keyword used by filters and queries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// A tag available for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique, case-sensitive name.
    pub name: String,
    /// Display color.
    #[serde(default)]
    pub color: HexColor,
}

impl Tag {
    /// Create a tag.
    pub fn new(name: impl Into<String>, color: HexColor) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn builder_sets_fields() {
        let task = Task::new("Write report")
            .with_id(TaskId(3))
            .with_description("quarterly")
            .with_priority("HIGH")
            .with_tags(["work", "work"])
            .completed(true);

        assert_eq!(task.id, Some(TaskId(3)));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.tags, vec!["work".to_owned(), "work".to_owned()]);
        assert_eq!(task.status(), TaskStatus::Completed);
        assert!(task.has_tag("work"));
        assert!(!task.has_tag("Work"));
    }

    #[test]
    fn overdue_only_for_pending_tasks_past_due() {
        let now = OffsetDateTime::now_utc();
        let past = Task::new("late").with_due_date(Some(now - Duration::days(1)));
        assert!(past.is_overdue(now));
        assert!(!past.clone().completed(true).is_overdue(now));
        assert!(!Task::new("no due").is_overdue(now));
    }

    #[test]
    fn serializes_wire_compatible_shape() {
        let task = Task::new("Ship")
            .with_id(TaskId(9))
            .with_tags(["release"]);
        let value = serde_json::to_value(&task).unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(value["id"], 9);
        assert_eq!(value["is_completed"], false);
        assert_eq!(value["priority"], "medium");
        assert!(value["due_date"].is_null());
        assert_eq!(value["tags"][0], "release");
    }
}
