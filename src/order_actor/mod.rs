//! Order tables: order headers and order lines.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::{Order, OrderItem, OrderStatus};
use crate::notify::Notifier;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Row-specific operations on an order header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    /// Admin status change (e.g. `pending` → `preparing`).
    Transition(OrderStatus),
}

/// Creates the orders and order items tables and the client over both.
///
/// The order items actor must be run with the orders table's client as its
/// context (see [`crate::lifecycle::Restaurant`]).
pub fn new(
    buffer_size: usize,
    notifier: Notifier,
) -> (ResourceActor<Order>, ResourceActor<OrderItem>, OrderClient) {
    let order_id_counter = Arc::new(AtomicU64::new(1));
    let next_order_id = move || {
        let id = order_id_counter.fetch_add(1, Ordering::SeqCst);
        format!("order_{}", id)
    };
    let line_id_counter = Arc::new(AtomicU64::new(1));
    let next_line_id = move || {
        let id = line_id_counter.fetch_add(1, Ordering::SeqCst);
        format!("order_item_{}", id)
    };

    let (order_actor, orders) = ResourceActor::new(buffer_size, next_order_id);
    let (item_actor, items) = ResourceActor::new(buffer_size, next_line_id);
    let client = OrderClient::new(orders, items, notifier);

    (order_actor, item_actor, client)
}
