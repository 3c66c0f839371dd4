//! Pure data structures (rows and DTOs) for the restaurant.
//!
//! Row types implement the [`ActorEntity`](crate::framework::ActorEntity) trait in
//! their `*_actor` module.

pub mod cart;
pub mod menu;
pub mod order;
pub mod reservation;
pub mod session;

pub use cart::*;
pub use menu::*;
pub use order::*;
pub use reservation::*;
pub use session::*;
