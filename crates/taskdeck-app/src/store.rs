//! In-memory task/tag state reconciled against a [`TaskBackend`].
//!
//! The store publishes immutable [`StoreSnapshot`]s through a `watch` channel.
//! Tasks and tags are independent slices: a load only ever replaces its own
//! slice, and each slice carries a ticket so that a response issued before a
//! newer, already-applied one is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use taskdeck_client::{BackendError, TaskBackend};
use taskdeck_core::{Tag, Task, TaskId, ValidationError, validate_tag_name, validate_title};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Failure of a store operation. Prior state is left untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A tag with this name is already loaded.
    #[error("tag '{0}' already exists")]
    DuplicateTag(String),
    /// The id does not refer to a loaded task.
    #[error("task {0} is not loaded")]
    UnknownTask(TaskId),
    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StoreError {
    /// Convert the error into a message that is friendly for end-users.
    #[must_use]
    pub fn describe_user_facing(&self) -> String {
        match self {
            Self::Validation(err) => err.describe_user_facing().to_owned(),
            Self::DuplicateTag(name) => format!("Tag \"{name}\" already exists"),
            Self::UnknownTask(_) => "Task not found".to_owned(),
            Self::Backend(err) => err.describe_user_facing(),
        }
    }
}

/// Immutable view of the store at one point in time.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// Tasks in backend order.
    pub tasks: Arc<Vec<Task>>,
    /// Available tags in backend order.
    pub tags: Arc<Vec<Tag>>,
    tasks_in_flight: u32,
    tags_in_flight: u32,
    tasks_ticket: u64,
    tags_ticket: u64,
}

impl StoreSnapshot {
    /// Snapshot holding the given slices with nothing in flight.
    #[must_use]
    pub fn new(tasks: Vec<Task>, tags: Vec<Tag>) -> Self {
        Self {
            tasks: Arc::new(tasks),
            tags: Arc::new(tags),
            ..Self::default()
        }
    }

    /// True while at least one task load is outstanding.
    #[must_use]
    pub const fn is_loading_tasks(&self) -> bool {
        self.tasks_in_flight > 0
    }

    /// True while at least one tag load is outstanding.
    #[must_use]
    pub const fn is_loading_tags(&self) -> bool {
        self.tags_in_flight > 0
    }

    /// Locally known task by id.
    #[must_use]
    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == Some(id))
    }

    /// Whether a tag with exactly this name exists.
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    const fn in_flight_mut(&mut self, slice: Slice) -> &mut u32 {
        match slice {
            Slice::Tasks => &mut self.tasks_in_flight,
            Slice::Tags => &mut self.tags_in_flight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slice {
    Tasks,
    Tags,
}

/// Clears a loading flag when dropped, on success and failure alike.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<StoreSnapshot>,
    slice: Slice,
}

impl<'a> LoadingGuard<'a> {
    fn begin(state: &'a watch::Sender<StoreSnapshot>, slice: Slice) -> Self {
        state.send_modify(|snapshot| *snapshot.in_flight_mut(slice) += 1);
        Self { state, slice }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let slice = self.slice;
        self.state.send_modify(|snapshot| {
            let counter = snapshot.in_flight_mut(slice);
            *counter = counter.saturating_sub(1);
        });
    }
}

/// State container for tasks and tags.
pub struct TaskStore<B> {
    backend: B,
    state: watch::Sender<StoreSnapshot>,
    next_ticket: AtomicU64,
    disposed: AtomicBool,
}

impl<B> TaskStore<B> {
    /// Create an empty store.
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::default());
        Self {
            backend,
            state,
            next_ticket: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    /// Backend handle.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified after every applied change.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    /// Stop applying responses. Requests still in flight complete but are discarded.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        debug!("Task store disposed");
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply `change` to `slice` unless the store is disposed or a newer
    /// ticket already landed on that slice.
    fn apply(
        &self,
        slice: Slice,
        ticket: u64,
        change: impl FnOnce(&mut StoreSnapshot) -> bool,
    ) -> bool {
        if self.is_disposed() {
            debug!(?slice, ticket, "Dropping response for disposed store");
            return false;
        }
        self.state.send_if_modified(|snapshot| {
            let applied = match slice {
                Slice::Tasks => &mut snapshot.tasks_ticket,
                Slice::Tags => &mut snapshot.tags_ticket,
            };
            if ticket <= *applied {
                debug!(?slice, ticket, applied = *applied, "Discarding stale response");
                return false;
            }
            *applied = ticket;
            change(snapshot)
        })
    }
}

impl<B: TaskBackend> TaskStore<B> {
    /// Load tasks and tags concurrently. Each result updates only its own slice.
    ///
    /// # Errors
    /// Returns the first failure; the other slice is still applied if it succeeded.
    pub async fn load_all(&self) -> Result<(), StoreError> {
        let (tasks, tags) = tokio::join!(self.reload_tasks(), self.reload_tags());
        tasks.and(tags)
    }

    /// Replace the task slice with a fresh backend copy.
    ///
    /// # Errors
    /// Returns the backend failure; the previous tasks stay in place.
    pub async fn reload_tasks(&self) -> Result<(), StoreError> {
        let ticket = self.ticket();
        let _loading = LoadingGuard::begin(&self.state, Slice::Tasks);
        let tasks = self.backend.get_tasks().await.inspect_err(|err| {
            warn!(error = %err, "Failed to load tasks");
        })?;
        let count = tasks.len();
        if self.apply(Slice::Tasks, ticket, |snapshot| {
            snapshot.tasks = Arc::new(tasks);
            true
        }) {
            info!(count, "Tasks reloaded");
        }
        Ok(())
    }

    /// Replace the tag slice with a fresh backend copy.
    ///
    /// # Errors
    /// Returns the backend failure; the previous tags stay in place.
    pub async fn reload_tags(&self) -> Result<(), StoreError> {
        let ticket = self.ticket();
        let _loading = LoadingGuard::begin(&self.state, Slice::Tags);
        let tags = self.backend.get_tags().await.inspect_err(|err| {
            warn!(error = %err, "Failed to load tags");
        })?;
        let count = tags.len();
        if self.apply(Slice::Tags, ticket, |snapshot| {
            snapshot.tags = Arc::new(tags);
            true
        }) {
            info!(count, "Tags reloaded");
        }
        Ok(())
    }

    /// Create a task, then reload tasks to learn its backend identity.
    ///
    /// # Errors
    /// Rejects blank titles before any request; otherwise returns backend failures.
    pub async fn add_task(&self, task: &Task) -> Result<(), StoreError> {
        validate_title(&task.title)?;
        self.backend.add_task(task).await.inspect_err(|err| {
            warn!(error = %err, "Failed to add task");
        })?;
        info!(title = %task.title, "Task added");
        self.reload_tasks().await
    }

    /// Replace a task, then reload tasks.
    ///
    /// Returns `Ok(false)` without contacting the backend when `task.id` is absent.
    ///
    /// # Errors
    /// Rejects blank titles before any request; otherwise returns backend failures.
    pub async fn update_task(&self, task: &Task) -> Result<bool, StoreError> {
        let Some(id) = task.id else {
            debug!(title = %task.title, "Skipping update for task without id");
            return Ok(false);
        };
        validate_title(&task.title)?;
        self.backend.update_task(task).await.inspect_err(|err| {
            warn!(%id, error = %err, "Failed to update task");
        })?;
        info!(%id, "Task updated");
        self.reload_tasks().await?;
        Ok(true)
    }

    /// Flip the completion flag of a loaded task.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownTask`] when the id is not loaded, or the update failure.
    pub async fn toggle_completed(&self, id: TaskId) -> Result<Task, StoreError> {
        let mut task = self
            .snapshot()
            .find_task(id)
            .cloned()
            .ok_or(StoreError::UnknownTask(id))?;
        task.is_completed = !task.is_completed;
        self.update_task(&task).await?;
        Ok(task)
    }

    /// Delete a task, then reload tasks.
    ///
    /// # Errors
    /// Returns backend failures.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        self.backend.delete_task(id).await.inspect_err(|err| {
            warn!(%id, error = %err, "Failed to delete task");
        })?;
        info!(%id, "Task deleted");
        self.reload_tasks().await
    }

    /// Create a tag and append it locally without a reload.
    ///
    /// Returns the created tag so the caller can select it.
    ///
    /// # Errors
    /// Rejects blank and locally duplicated names before any request;
    /// otherwise returns backend failures.
    pub async fn add_tag(&self, tag: Tag) -> Result<Tag, StoreError> {
        validate_tag_name(&tag.name)?;
        if self.snapshot().has_tag(&tag.name) {
            return Err(StoreError::DuplicateTag(tag.name));
        }
        self.backend.add_tag(&tag).await.inspect_err(|err| {
            warn!(name = %tag.name, error = %err, "Failed to add tag");
        })?;
        let ticket = self.ticket();
        let appended = tag.clone();
        self.apply(Slice::Tags, ticket, move |snapshot| {
            if snapshot.has_tag(&appended.name) {
                return false;
            }
            Arc::make_mut(&mut snapshot.tags).push(appended);
            true
        });
        info!(name = %tag.name, color = %tag.color, "Tag added");
        Ok(tag)
    }

    /// Delete a tag, remove it locally, then reload tasks.
    ///
    /// Tasks keep any reference to the deleted name.
    ///
    /// # Errors
    /// Returns backend failures.
    pub async fn delete_tag(&self, name: &str) -> Result<(), StoreError> {
        self.backend.delete_tag(name).await.inspect_err(|err| {
            warn!(name, error = %err, "Failed to delete tag");
        })?;
        let ticket = self.ticket();
        self.apply(Slice::Tags, ticket, |snapshot| {
            let before = snapshot.tags.len();
            Arc::make_mut(&mut snapshot.tags).retain(|tag| tag.name != name);
            snapshot.tags.len() != before
        });
        info!(name, "Tag deleted");
        self.reload_tasks().await
    }
}
