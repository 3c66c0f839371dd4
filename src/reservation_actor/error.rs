use thiserror::Error;

use crate::model::ReservationStatus;

/// Errors that can occur during reservation operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReservationError {
    /// Booking needs an authenticated session.
    #[error("Sign in required")]
    SignInRequired,

    /// The requested reservation was not found.
    #[error("Reservation not found: {0}")]
    NotFound(String),

    /// The booking form data is invalid.
    #[error("Reservation validation error: {0}")]
    ValidationError(String),

    #[error("Cannot move reservation from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    /// The operation needs an admin session.
    #[error("Admin privileges required")]
    AdminRequired,

    /// An error occurred while communicating with the data store.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for ReservationError {
    fn from(msg: String) -> Self {
        ReservationError::ActorCommunicationError(msg)
    }
}
