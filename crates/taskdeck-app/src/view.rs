//! List view-model: which tasks are visible and which filter chip is selected.

use taskdeck_core::{
    HexColor, NamedFilter, Tag, Task, TaskQuery, filter_by_query, parse_query, resolve_tag_color,
    select_by_filter, sort_tasks,
};

use crate::store::StoreSnapshot;

/// Which selector drives the visible list. Exactly one is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// A chip from [`NamedFilter::chips`].
    Named(NamedFilter),
    /// A parsed free-text query.
    Search(TaskQuery),
}

impl Default for ViewMode {
    fn default() -> Self {
        Self::Named(NamedFilter::All)
    }
}

/// One selectable filter chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    /// Selector applied when the chip is chosen.
    pub filter: NamedFilter,
    /// Whether this chip is the active selector.
    pub selected: bool,
    /// Tag color for tag chips.
    pub color: Option<HexColor>,
}

/// Task totals shown next to the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    /// Every loaded task.
    pub total: usize,
    /// Incomplete tasks.
    pub pending: usize,
    /// Completed tasks.
    pub completed: usize,
}

/// Selector state for the task list, independent of IO.
#[derive(Debug, Default)]
pub struct TaskListView {
    mode: ViewMode,
    search_text: String,
}

#[allow(clippy::missing_const_for_fn)]
impl TaskListView {
    /// Active selector.
    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    /// Raw text of the active search; empty in named mode.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Switch to named mode, dropping any search text.
    pub fn set_filter(&mut self, filter: NamedFilter) {
        self.mode = ViewMode::Named(filter);
        self.search_text.clear();
    }

    /// Switch to search mode. Text without any token returns to `Named(All)`.
    pub fn set_search(&mut self, text: &str) {
        let query = parse_query(text);
        if query.is_empty() {
            self.set_filter(NamedFilter::All);
        } else {
            self.mode = ViewMode::Search(query);
            text.clone_into(&mut self.search_text);
        }
    }

    /// Sorted tasks accepted by the active mode.
    pub fn visible(&self, snapshot: &StoreSnapshot) -> Vec<Task> {
        let sorted = sort_tasks(&snapshot.tasks);
        match &self.mode {
            ViewMode::Named(filter) => select_by_filter(filter, &sorted),
            ViewMode::Search(query) => filter_by_query(&sorted, query),
        }
    }

    /// Fall back to `All` when the selected tag chip no longer exists.
    ///
    /// Returns `true` when the selection changed.
    pub fn reconcile_tags(&mut self, tags: &[Tag]) -> bool {
        let ViewMode::Named(filter) = &self.mode else {
            return false;
        };
        let Some(name) = filter.tag_name() else {
            return false;
        };
        if tags.iter().any(|tag| tag.name == name) {
            return false;
        }
        self.set_filter(NamedFilter::All);
        true
    }

    /// Select the chip of a freshly created tag.
    pub fn select_new_tag(&mut self, tag: &Tag) {
        self.set_filter(NamedFilter::Tag(tag.name.clone()));
    }

    /// Built-in chips followed by one per tag.
    pub fn chips(&self, snapshot: &StoreSnapshot) -> Vec<FilterChip> {
        let active = match &self.mode {
            ViewMode::Named(filter) => Some(filter),
            ViewMode::Search(_) => None,
        };
        NamedFilter::chips(&snapshot.tags)
            .into_iter()
            .map(|filter| FilterChip {
                selected: active == Some(&filter),
                color: filter
                    .tag_name()
                    .map(|name| resolve_tag_color(name, &snapshot.tags)),
                filter,
            })
            .collect()
    }

    /// Totals over every loaded task, regardless of the active mode.
    pub fn counts(snapshot: &StoreSnapshot) -> TaskCounts {
        let total = snapshot.tasks.len();
        let completed = snapshot.tasks.iter().filter(|task| task.is_completed).count();
        TaskCounts {
            total,
            pending: total - completed,
            completed,
        }
    }
}
