//! Application layer for taskdeck.
//!
//! This crate holds the task/tag state container, the list view-model, and the
//! client configuration shared by every front end.

pub mod config;
pub mod store;
pub mod view;

// Re-exports for convenience
pub use config::{BackendConfig, ClientConfig, ENV_CONFIG_PATH, default_config_path};
pub use store::{StoreError, StoreSnapshot, TaskStore};
pub use view::{FilterChip, TaskCounts, TaskListView, ViewMode};
