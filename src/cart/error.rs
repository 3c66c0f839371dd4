//! Error types for the cart storage bridge.

use thiserror::Error;

/// Errors raised by a [`CartStorage`](super::CartStorage) backend.
///
/// The cart never surfaces these to the visitor: the in-memory cart stays
/// authoritative and failures are only logged.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file or directory could not be read or written.
    #[error("Cart storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cart could not be serialized.
    #[error("Cart serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend refused the operation.
    #[error("Cart storage unavailable: {0}")]
    Unavailable(String),
}
