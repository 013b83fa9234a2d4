use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::{Task, TaskStatus};

const PRIORITY_PREFIX: &str = "priority:";
const STATUS_PREFIX: &str = "status:";
const TAG_PREFIX: &str = "tag:";

/// Parsed free-text search.
///
/// Every constraint must hold for a task to match. All values are lower-case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Required priority (`priority:<value>`, last one wins).
    pub priority: Option<String>,
    /// Required status (`status:<value>`, last one wins).
    pub status: Option<String>,
    /// Tags that must all be present (`tag:<value>`).
    pub tags: BTreeSet<String>,
    /// Plain words; each must hit at least one task field.
    pub terms: Vec<String>,
}

/// Parse a search string. See [`TaskQuery`].
#[must_use]
pub fn parse_query(input: &str) -> TaskQuery {
    let lowered = input.to_lowercase();
    let mut query = TaskQuery::default();
    for token in lowered.split_whitespace() {
        if let Some(value) = token.strip_prefix(PRIORITY_PREFIX) {
            query.priority = Some(value.to_owned());
        } else if let Some(value) = token.strip_prefix(STATUS_PREFIX) {
            query.status = Some(value.to_owned());
        } else if let Some(value) = token.strip_prefix(TAG_PREFIX) {
            query.tags.insert(value.to_owned());
        } else {
            query.terms.push(token.to_owned());
        }
    }
    query
}

/// Keep the tasks matching `query`, preserving input order.
#[must_use]
pub fn filter_by_query(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| query.matches(task))
        .cloned()
        .collect()
}

impl TaskQuery {
    /// True when the query places no constraint on tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.priority.is_none()
            && self.status.is_none()
            && self.tags.is_empty()
            && self.terms.is_empty()
    }

    /// Evaluate the query against a task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(priority) = &self.priority
            && task.priority.as_str().to_lowercase() != *priority
        {
            return false;
        }

        if let Some(status) = &self.status {
            let wanted = match status.as_str() {
                "pending" => TaskStatus::Pending,
                "completed" => TaskStatus::Completed,
                _ => return false,
            };
            if task.status() != wanted {
                return false;
            }
        }

        let task_tags: Vec<String> = task.tags.iter().map(|tag| tag.to_lowercase()).collect();
        if !self.tags.iter().all(|wanted| task_tags.contains(wanted)) {
            return false;
        }

        if self.terms.is_empty() {
            return true;
        }
        let haystack = Haystack {
            title: task.title.to_lowercase(),
            description: task.description.to_lowercase(),
            priority: task.priority.as_str().to_lowercase(),
            status: task.status(),
            tags: task_tags,
        };
        self.terms.iter().all(|term| haystack.contains(term))
    }
}

struct Haystack {
    title: String,
    description: String,
    priority: String,
    status: TaskStatus,
    tags: Vec<String>,
}

impl Haystack {
    fn contains(&self, term: &str) -> bool {
        self.title.contains(term)
            || self.description.contains(term)
            || self.priority.contains(term)
            || term == self.status.as_str()
            || self.tags.iter().any(|tag| tag.contains(term))
    }
}

impl FromStr for TaskQuery {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_query(s))
    }
}

impl fmt::Display for TaskQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = Vec::new();
        if let Some(priority) = &self.priority {
            tokens.push(format!("{PRIORITY_PREFIX}{priority}"));
        }
        if let Some(status) = &self.status {
            tokens.push(format!("{STATUS_PREFIX}{status}"));
        }
        tokens.extend(self.tags.iter().map(|tag| format!("{TAG_PREFIX}{tag}")));
        tokens.extend(self.terms.iter().cloned());
        f.write_str(&tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> Task {
        Task::new("Buy milk")
            .with_priority("high")
            .with_tags(["urgent"])
    }

    #[test]
    fn parses_typed_tokens_and_terms() {
        let query = parse_query("priority:high status:pending tag:urgent buy milk");
        assert_eq!(query.priority.as_deref(), Some("high"));
        assert_eq!(query.status.as_deref(), Some("pending"));
        assert_eq!(query.tags, BTreeSet::from(["urgent".to_owned()]));
        assert_eq!(query.terms, vec!["buy".to_owned(), "milk".to_owned()]);
    }

    #[test]
    fn parse_lowercases_drops_blanks_and_keeps_last_priority() {
        let query = parse_query("  PRIORITY:Low   priority:HIGH\t\tTag:Work  tag:work  Milk ");
        assert_eq!(query.priority.as_deref(), Some("high"));
        assert_eq!(query.tags.len(), 1);
        assert_eq!(query.terms, vec!["milk".to_owned()]);
        assert!(parse_query("   ").is_empty());
    }

    #[test]
    fn full_query_matches_until_status_changes() {
        let query = parse_query("priority:high status:pending tag:urgent buy milk");
        assert!(query.matches(&milk()));
        assert!(!query.matches(&milk().completed(true)));
    }

    #[test]
    fn unknown_status_matches_nothing() {
        let query = parse_query("status:done");
        assert!(!query.matches(&milk()));
        assert!(!query.matches(&milk().completed(true)));
    }

    #[test]
    fn tag_filter_is_case_insensitive_and_conjunctive() {
        let task = Task::new("Plan").with_tags(["Work", "Q3"]);
        assert!(parse_query("tag:work tag:q3").matches(&task));
        assert!(!parse_query("tag:work tag:home").matches(&task));
    }

    #[test]
    fn terms_search_every_field() {
        let task = Task::new("Call plumber")
            .with_description("Kitchen sink leaks")
            .with_priority("Medium")
            .with_tags(["Household"]);
        assert!(parse_query("plumb").matches(&task));
        assert!(parse_query("sink").matches(&task));
        assert!(parse_query("med").matches(&task));
        assert!(parse_query("pending").matches(&task));
        assert!(!parse_query("completed").matches(&task));
        assert!(parse_query("house").matches(&task));
        assert!(!parse_query("plumber garage").matches(&task));
    }

    #[test]
    fn priority_filter_compares_lowercased_value() {
        let task = Task::new("x").with_priority("Urgent");
        assert!(parse_query("priority:urgent").matches(&task));
        assert!(!parse_query("priority:high").matches(&task));
    }

    #[test]
    fn display_renders_canonical_text() {
        let query = parse_query("milk tag:b priority:HIGH tag:a");
        assert_eq!(query.to_string(), "priority:high tag:a tag:b milk");
        assert_eq!(parse_query(&query.to_string()), query);
    }

    #[test]
    fn filter_by_query_preserves_order() {
        let tasks = vec![
            Task::new("milk one"),
            Task::new("bread"),
            Task::new("milk two"),
        ];
        let hits = filter_by_query(&tasks, &parse_query("milk"));
        let titles: Vec<&str> = hits.iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, vec!["milk one", "milk two"]);
    }
}
