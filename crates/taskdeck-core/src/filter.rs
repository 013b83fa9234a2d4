use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::{Tag, Task};

/// Single-choice list selector, used instead of (never together with) a
/// free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NamedFilter {
    /// Every task.
    #[default]
    All,
    /// Incomplete tasks.
    Pending,
    /// Completed tasks.
    Completed,
    /// High-priority tasks.
    High,
    /// Tasks carrying this exact tag name.
    Tag(String),
}

impl NamedFilter {
    /// Key used by pickers and the CLI.
    #[must_use]
    pub fn as_key(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::High => "high",
            Self::Tag(name) => name,
        }
    }

    /// Whether `task` belongs to this selection.
    #[must_use]
    pub fn accepts(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.is_completed,
            Self::Completed => task.is_completed,
            Self::High => task.priority.is_high(),
            Self::Tag(name) => task.has_tag(name),
        }
    }

    /// Selectable filters for the given tag set: the built-ins, then one per tag.
    #[must_use]
    pub fn chips(tags: &[Tag]) -> Vec<Self> {
        let mut chips = vec![Self::All, Self::Pending, Self::Completed, Self::High];
        chips.extend(tags.iter().map(|tag| Self::Tag(tag.name.clone())));
        chips
    }

    /// Name of the referenced tag, if this is a tag selector.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::Tag(name) => Some(name),
            _ => None,
        }
    }
}

impl FromStr for NamedFilter {
    type Err = Infallible;

    /// Built-in keys are exact; anything else is taken as a tag name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "all" => Self::All,
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "high" => Self::High,
            other => Self::Tag(other.to_owned()),
        })
    }
}

impl From<&str> for NamedFilter {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(filter) => filter,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for NamedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Apply a named filter, preserving input order.
#[must_use]
pub fn select_by_filter(filter: &NamedFilter, tasks: &[Task]) -> Vec<Task> {
    if *filter == NamedFilter::All {
        return tasks.to_vec();
    }
    tasks
        .iter()
        .filter(|task| filter.accepts(task))
        .cloned()
        .collect()
}
