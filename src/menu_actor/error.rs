//! Error types for the menu tables.

use thiserror::Error;

/// Errors that can occur during menu and category operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MenuError {
    /// The requested menu item or category was not found.
    #[error("Menu entry not found: {0}")]
    NotFound(String),

    /// A menu item references a category that doesn't exist.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The data provided is invalid (empty name, negative price, ...).
    #[error("Menu validation error: {0}")]
    ValidationError(String),

    /// The operation needs an admin session.
    #[error("Admin privileges required")]
    AdminRequired,

    /// An error occurred while communicating with the data store.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for MenuError {
    fn from(msg: String) -> Self {
        MenuError::ActorCommunicationError(msg)
    }
}
