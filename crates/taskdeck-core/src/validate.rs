use thiserror::Error;

/// Input rejected before it reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Title is empty or whitespace.
    #[error("task title must not be empty")]
    EmptyTitle,
    /// Tag name is empty or whitespace.
    #[error("tag name must not be empty")]
    EmptyTagName,
}

impl ValidationError {
    /// Message suitable for an inline notification.
    #[must_use]
    pub const fn describe_user_facing(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "Please enter a task title",
            Self::EmptyTagName => "Please enter a tag name",
        }
    }
}

/// Reject blank task titles.
///
/// # Errors
/// Returns [`ValidationError::EmptyTitle`] for empty or whitespace-only input.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

/// Reject blank tag names.
///
/// # Errors
/// Returns [`ValidationError::EmptyTagName`] for empty or whitespace-only input.
pub fn validate_tag_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyTagName);
    }
    Ok(())
}
