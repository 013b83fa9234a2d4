//! Backend access for taskdeck: the request/response contract and its HTTP implementation.

pub mod error;
pub mod http;
pub mod wire;

pub use error::BackendError;
pub use http::HttpBackend;

use std::sync::Arc;

use taskdeck_core::{Tag, Task, TaskId};

/// Remote source of truth for tasks and tags.
///
/// Every method is a single round trip. Implementations never retry.
#[allow(async_fn_in_trait)]
pub trait TaskBackend: Send + Sync {
    /// Fetch every task.
    ///
    /// # Errors
    /// Returns a transport, decode, or rejection error.
    async fn get_tasks(&self) -> Result<Vec<Task>, BackendError>;

    /// Fetch every tag.
    ///
    /// # Errors
    /// Returns a transport, decode, or rejection error.
    async fn get_tags(&self) -> Result<Vec<Tag>, BackendError>;

    /// Create a task. Its id, if any, is not sent.
    ///
    /// # Errors
    /// Returns a transport, decode, or rejection error.
    async fn add_task(&self, task: &Task) -> Result<(), BackendError>;

    /// Replace an existing task.
    ///
    /// # Errors
    /// Returns a transport, decode, or rejection error.
    async fn update_task(&self, task: &Task) -> Result<(), BackendError>;

    /// Delete a task.
    ///
    /// # Errors
    /// Returns a transport, decode, or rejection error.
    async fn delete_task(&self, id: TaskId) -> Result<(), BackendError>;

    /// Create a tag.
    ///
    /// # Errors
    /// Returns a transport, decode, or rejection error.
    async fn add_tag(&self, tag: &Tag) -> Result<(), BackendError>;

    /// Delete a tag by name.
    ///
    /// # Errors
    /// Returns a transport, decode, or rejection error.
    async fn delete_tag(&self, name: &str) -> Result<(), BackendError>;
}

impl<B: TaskBackend> TaskBackend for Arc<B> {
    async fn get_tasks(&self) -> Result<Vec<Task>, BackendError> {
        (**self).get_tasks().await
    }

    async fn get_tags(&self) -> Result<Vec<Tag>, BackendError> {
        (**self).get_tags().await
    }

    async fn add_task(&self, task: &Task) -> Result<(), BackendError> {
        (**self).add_task(task).await
    }

    async fn update_task(&self, task: &Task) -> Result<(), BackendError> {
        (**self).update_task(task).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), BackendError> {
        (**self).delete_task(id).await
    }

    async fn add_tag(&self, tag: &Tag) -> Result<(), BackendError> {
        (**self).add_tag(tag).await
    }

    async fn delete_tag(&self, name: &str) -> Result<(), BackendError> {
        (**self).delete_tag(name).await
    }
}
