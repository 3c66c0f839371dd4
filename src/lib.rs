//! # Bistro
//!
//! > **The storefront core of a restaurant: menu, cart, checkout and reservations.**
//!
//! Every collection of the restaurant's data store (categories, menu items,
//! orders, order lines, reservations) is a table owned by one Tokio actor. The
//! visitor's cart is a plain owned value that persists itself to a key-value
//! store, and checkout turns it into an order header plus its lines.
//!
//! ## 🏗️ Design Philosophy
//!
//! - **One actor per table**: rows are owned by a single task, so no locks guard them.
//! - **One owner per cart**: the cart is passed by `&mut` to whoever changes it,
//!   and display surfaces follow it through notifications.
//! - **No silent partial orders**: an order header whose lines were refused is
//!   removed again before checkout reports the failure.
//!
//! ## 🚀 Core Concepts
//!
//! ### Generics: The Power of `T`
//! `ResourceActor<T: ActorEntity>` is written once and stores anything that
//! implements [`ActorEntity`](framework::ActorEntity): menu items, orders and
//! reservations all go through the same message loop.
//!
//! ### Mocking: Testing without Pain
//! [`framework::mock::MockClient`] scripts a table's answers, which is how the
//! tests make the data store accept an order header and then reject its lines.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Each table defines its own error enum ([`MenuError`](menu_actor::MenuError),
//! [`OrderError`](order_actor::OrderError), ...). Clients recover it from the
//! framework's boxed error so callers can match on it directly.
//!
//! ### 2. Async Context Injection
//! Dependencies are injected when a table starts running, not when it is built.
//! Menu items receive the categories table; order lines receive the orders table.
//!
//! ### 3. Observability
//! `tracing` everywhere, with structured fields and spans on client calls.
//! See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Generic tables: CRUD, all-or-nothing batches, filtered listing and realtime
//! change feeds.
//!
//! ### 2. The Orchestrator ([`lifecycle`])
//! [`Restaurant`](lifecycle::Restaurant) starts the tables, wires them, and
//! builds carts and checkouts.
//!
//! ### 3. The Interface ([`clients`])
//! Typed clients with permission checks and user notifications.
//!
//! ### 4. The Tables ([`menu_actor`], [`order_actor`], [`reservation_actor`])
//! Concrete [`ActorEntity`](framework::ActorEntity) implementations.
//!
//! ### 5. The Visitor ([`cart`], [`checkout`], [`notify`], [`payment`])
//! The cart store and its persistence, order submission, toasts, and the
//! payment session boundary.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # Keep the cart on disk between runs
//! BISTRO_DATA_DIR=/tmp/bistro RUST_LOG=info cargo run
//! ```

pub mod cart;
pub mod checkout;
pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod menu_actor;
pub mod model;
pub mod notify;
pub mod order_actor;
pub mod payment;
pub mod reservation_actor;
