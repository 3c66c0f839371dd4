//! Runtime orchestration and lifecycle management.
//!
//! - [`Restaurant`]: starts every table, wires tables that depend on each other,
//!   hands out clients, carts and checkouts, and shuts everything down.
//! - [`setup_tracing`]: initializes logging for the binary.

pub mod restaurant;
pub mod tracing;

pub use restaurant::*;
pub use tracing::*;
