//! Order headers and order lines.
//!
//! Orders live in the orders table; their lines live in the order items table.
//! See [`crate::order_actor`] for both [`ActorEntity`](crate::framework::ActorEntity)
//! implementations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::model::LineItem;

/// Kitchen workflow of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Completed and cancelled orders accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a customer order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting an order header. Status always starts as `pending`.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub total_amount: Decimal,
}

impl Order {
    /// Creates a new `pending` order stamped with the current time.
    pub fn new(id: impl Into<String>, params: OrderCreate) -> Self {
        Self {
            id: id.into(),
            user_id: params.user_id,
            customer_name: params.customer_name,
            customer_email: params.customer_email,
            customer_phone: params.customer_phone,
            delivery_address: params.delivery_address,
            notes: params.notes,
            total_amount: params.total_amount,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// One line of a placed order.
///
/// A denormalized snapshot: `price` and `item_name` are copied from the cart and
/// never follow later menu edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: u32,
    pub price: Decimal,
    pub item_name: String,
}

/// Payload for inserting an order line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemCreate {
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: u32,
    pub price: Decimal,
    pub item_name: String,
}

impl OrderItemCreate {
    pub fn from_line_item(order_id: &str, item: &LineItem) -> Self {
        Self {
            order_id: order_id.to_string(),
            menu_item_id: item.id.clone(),
            quantity: item.quantity,
            price: item.unit_price,
            item_name: item.name.clone(),
        }
    }
}
