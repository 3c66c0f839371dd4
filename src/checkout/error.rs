use thiserror::Error;

use crate::model::Route;
use crate::order_actor::OrderError;

/// Errors returned by [`Checkout::submit`](super::Checkout::submit).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Sign in required")]
    SignInRequired,

    #[error("Cart is empty")]
    EmptyCart,

    /// A required delivery field is blank; carries the field name.
    #[error("Missing delivery detail: {0}")]
    InvalidDetails(&'static str),

    #[error("A submission is already in progress")]
    AlreadySubmitting,

    #[error("This checkout has already been completed")]
    AlreadyCompleted,

    /// The data store refused the order or its lines.
    #[error("Order could not be placed: {0}")]
    Order(#[from] OrderError),

    /// The lines failed and the header could not be removed either.
    #[error("Order {order_id} was left without lines: {source}")]
    OrphanedOrder { order_id: String, source: OrderError },
}

impl CheckoutError {
    /// Where the visitor should be sent, if the error calls for a redirect.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            CheckoutError::SignInRequired => Some(Route::SignIn),
            CheckoutError::EmptyCart => Some(Route::Cart),
            CheckoutError::AlreadyCompleted => Some(Route::Profile),
            _ => None,
        }
    }
}
