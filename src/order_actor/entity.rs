//! [`ActorEntity`] implementations for [`Order`] and [`OrderItem`].
//!
//! Order headers have no free-form updates: after checkout the only change an
//! order sees is a status transition, expressed as an [`OrderAction`].

use async_trait::async_trait;

use super::{OrderAction, OrderError};
use crate::framework::{ActorEntity, ResourceClient};
use crate::model::{Order, OrderCreate, OrderItem, OrderItemCreate, OrderStatus};

#[async_trait]
impl ActorEntity for Order {
    type Id = String;
    type Create = OrderCreate;
    type Update = ();
    type Action = OrderAction;
    type ActionResult = OrderStatus;
    type Context = ();
    type Error = OrderError;

    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.total_amount.is_sign_negative() && !params.total_amount.is_zero() {
            return Err(OrderError::ValidationError(format!(
                "total must not be negative, got {}",
                params.total_amount
            )));
        }
        if params.user_id.is_empty() {
            return Err(OrderError::ValidationError("order needs a user".to_string()));
        }
        Ok(Self::new(id, params))
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), OrderError> {
        Ok(())
    }

    /// Moves the order to a new status and returns it.
    ///
    /// # Rules
    /// - `completed` and `cancelled` are terminal
    /// - any other status may move to any status
    async fn handle_action(&mut self, action: OrderAction, _ctx: &()) -> Result<OrderStatus, OrderError> {
        match action {
            OrderAction::Transition(to) => {
                if self.status.is_terminal() && self.status != to {
                    return Err(OrderError::InvalidTransition {
                        from: self.status,
                        to,
                    });
                }
                self.status = to;
                Ok(to)
            }
        }
    }
}

#[async_trait]
impl ActorEntity for OrderItem {
    type Id = String;
    type Create = OrderItemCreate;
    type Update = ();
    type Action = ();
    type ActionResult = ();
    type Context = ResourceClient<Order>;
    type Error = OrderError;

    fn from_create_params(id: String, params: OrderItemCreate) -> Result<Self, OrderError> {
        if params.quantity == 0 {
            return Err(OrderError::ValidationError(format!(
                "quantity of {} must be at least 1",
                params.menu_item_id
            )));
        }
        if params.price.is_sign_negative() && !params.price.is_zero() {
            return Err(OrderError::ValidationError(format!(
                "price of {} must not be negative",
                params.menu_item_id
            )));
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            menu_item_id: params.menu_item_id,
            quantity: params.quantity,
            price: params.price,
            item_name: params.item_name,
        })
    }

    /// Rejects lines whose order header doesn't exist.
    async fn on_create(&mut self, orders: &ResourceClient<Order>) -> Result<(), OrderError> {
        match orders.get(self.order_id.clone()).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(OrderError::UnknownOrder(self.order_id.clone())),
            Err(e) => Err(OrderError::ActorCommunicationError(e.to_string())),
        }
    }

    async fn on_update(&mut self, _update: (), _ctx: &ResourceClient<Order>) -> Result<(), OrderError> {
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &ResourceClient<Order>) -> Result<(), OrderError> {
        Ok(())
    }
}
