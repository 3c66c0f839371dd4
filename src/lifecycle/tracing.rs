//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide `tracing` subscriber. Levels come
//! from `RUST_LOG`; output is compact and hides module paths, since every table
//! already tags its lines with `entity_type`.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle events, orders placed, failed cart writes
//! RUST_LOG=info cargo run
//!
//! # Full payloads (`?params`) for every table request
//! RUST_LOG=debug cargo run
//!
//! # Only the checkout flow
//! RUST_LOG=bistro::checkout=debug cargo run
//! ```
//!
//! ## Checkout Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO submit{items=2}:place{user_id=user_1 total=24.50}: Created entity_type="Order" id=order_1 size=1
//! INFO submit{items=2}:place{user_id=user_1 total=24.50}: Order header stored order_id=order_1
//! INFO submit{items=2}:add_items{count=2}: Batch created entity_type="OrderItem" count=2 size=2
//! INFO submit{items=2}: Cart cleared
//! INFO submit{items=2}: Order placed order_id=order_1 total=24.50
//! ```
//!
//! **When the order lines are refused**:
//!
//! ```text
//! WARN submit{items=2}:add_items{count=2}: Batch rejected entity_type="OrderItem" error=...
//! WARN submit{items=2}:discard{order_id="order_1"}: Discarding order header
//! INFO submit{items=2}:discard{order_id="order_1"}: Deleted entity_type="Order" id=order_1 size=0
//! WARN submit{items=2}: Checkout failed error=Order could not be placed: ...
//! ```
//!
//! Use `debug` level to see full payloads at function entry points.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Don't show module paths - tables log entity_type instead
        .compact() // Compact format shows spans inline (e.g., "submit:place")
        .init();
}
