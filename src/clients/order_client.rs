use crate::clients::actor_client::{recover_error, ActorClient};
use crate::framework::{FrameworkError, ResourceChange, ResourceClient};
use crate::model::{Order, OrderCreate, OrderItem, OrderItemCreate, OrderStatus, Session};
use crate::notify::{Notification, Notifier};
use crate::order_actor::{OrderAction, OrderError};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Client for the orders and order items tables.
///
/// Checkout writes through [`place`](Self::place) and
/// [`add_items`](Self::add_items); order history and the admin dashboard read
/// through the listing methods.
#[derive(Clone)]
pub struct OrderClient {
    orders: ResourceClient<Order>,
    items: ResourceClient<OrderItem>,
    notifier: Notifier,
}

impl OrderClient {
    pub fn new(orders: ResourceClient<Order>, items: ResourceClient<OrderItem>, notifier: Notifier) -> Self {
        Self {
            orders,
            items,
            notifier,
        }
    }

    /// Inserts an order header and returns its id.
    #[instrument(skip(self, order), fields(user_id = %order.user_id, total = %order.total_amount))]
    pub async fn place(&self, order: OrderCreate) -> Result<String, OrderError> {
        debug!(?order, "place called");
        let id = self.orders.create(order).await.map_err(Self::map_error)?;
        info!(order_id = %id, "Order header stored");
        Ok(id)
    }

    /// Inserts every line of an order in one all-or-nothing batch.
    #[instrument(skip(self, lines), fields(count = lines.len()))]
    pub async fn add_items(&self, lines: Vec<OrderItemCreate>) -> Result<Vec<String>, OrderError> {
        self.items.create_batch(lines).await.map_err(Self::map_error)
    }

    /// Removes an order header that never got its lines.
    #[instrument(skip(self))]
    pub async fn discard(&self, order_id: String) -> Result<(), OrderError> {
        warn!("Discarding order header");
        self.orders.delete(order_id).await.map_err(Self::map_error)
    }

    /// A user's order history, newest first.
    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderError> {
        let user_id = user_id.to_string();
        let orders = self
            .orders
            .list(move |order: &Order| order.user_id == user_id)
            .await
            .map_err(Self::map_error)?;
        Ok(newest_first(orders))
    }

    /// Every order, newest first (the admin dashboard).
    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.list(|_| true).await.map_err(Self::map_error)?;
        Ok(newest_first(orders))
    }

    /// The lines of one order, in insertion order.
    pub async fn items_for_order(&self, order_id: &str) -> Result<Vec<OrderItem>, OrderError> {
        let wanted = order_id.to_string();
        let mut lines = self
            .items
            .list(move |line: &OrderItem| line.order_id == wanted)
            .await
            .map_err(Self::map_error)?;
        lines.sort_by_key(|line| line_sequence(&line.id));
        Ok(lines)
    }

    /// Moves an order through the kitchen workflow. Admin only.
    #[instrument(skip(self, session))]
    pub async fn update_status(
        &self,
        session: &Session,
        order_id: String,
        status: OrderStatus,
    ) -> Result<OrderStatus, OrderError> {
        if !session.is_admin {
            warn!(user_id = %session.user_id, "Status change refused for non-admin");
            return Err(OrderError::AdminRequired);
        }
        let status = self
            .orders
            .perform_action(order_id.clone(), OrderAction::Transition(status))
            .await
            .map_err(Self::map_error)?;
        info!(%status, "Order status updated");
        self.notifier.notify(Notification::StatusUpdated {
            resource: "Order",
            id: order_id,
            status: status.to_string(),
        });
        Ok(status)
    }

    /// Realtime feed of changes to the orders table.
    pub async fn watch(&self) -> Result<broadcast::Receiver<ResourceChange<String>>, OrderError> {
        ActorClient::subscribe(self).await
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    orders
}

/// Numeric suffix of an `order_item_<n>` id, so `order_item_10` sorts after `order_item_9`.
fn line_sequence(id: &str) -> (u64, String) {
    let n = id
        .rsplit('_')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(u64::MAX);
    (n, id.to_string())
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.orders
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover_error(e, OrderError::NotFound)
    }
}
