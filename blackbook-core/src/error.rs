//! Error types for blackbook.

use thiserror::Error;

use crate::mapping::MappingError;
use crate::navigation::NavigationError;

/// Errors that can occur in blackbook operations.
#[derive(Error, Debug)]
pub enum BlackbookError {
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} {id} is still used by {by}")]
    InUse {
        kind: &'static str,
        id: String,
        by: String,
    },

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BlackbookError {
    pub fn not_found<T>(id: &str) -> Self {
        BlackbookError::NotFound {
            kind: short_type_name::<T>(),
            id: id.to_string(),
        }
    }
}

/// Result type alias for blackbook operations.
pub type BlackbookResult<T> = Result<T, BlackbookError>;

/// `TagBo` instead of `blackbook_core::model::tag::TagBo`, for messages.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    match without_generics.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
