//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).
//!
//! Permission checks (admin-only mutations) and user-facing notifications live
//! here, in front of the tables.

pub mod actor_client;
pub mod menu_client;
pub mod order_client;
pub mod reservation_client;

pub use actor_client::*;
pub use menu_client::*;
pub use order_client::*;
pub use reservation_client::*;
