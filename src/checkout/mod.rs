//! # Checkout Submission
//!
//! Turns the visitor's cart into a persisted order: one order header plus one
//! order line per cart item, then clears the cart.
//!
//! ## Submission states
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ Succeeded
//!                       │
//!                       └──err──▶ Failed ──submit──▶ Submitting
//! ```
//!
//! `Failed` is reported by [`Checkout::state`] until the next submit, which treats
//! it like `Idle`. `Succeeded` is final for a [`Checkout`]. A [`SubmissionGuard`]
//! puts the state back to `Idle` if a submission future is dropped half way.
//!
//! ## Partial failure
//!
//! The header and its lines are separate inserts. If the header goes in and the
//! lines don't, the header is deleted again before the error is returned, so
//! order history never shows an order without lines.

pub mod error;

pub use error::*;

use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, instrument, warn};

use crate::cart::CartStore;
use crate::clients::OrderClient;
use crate::model::{LineItem, OrderCreate, OrderItemCreate, Route, Session};
use crate::notify::{Notification, Notifier};
use crate::payment::{to_minor_units, PaymentGateway, PaymentRequest, PaymentSession};

/// What the checkout form collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: Option<String>,
}

impl DeliveryDetails {
    /// Name, phone and address are required; notes are optional.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            ("customer_name", &self.customer_name),
            ("customer_phone", &self.customer_phone),
            ("delivery_address", &self.delivery_address),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(CheckoutError::InvalidDetails(*field)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub total: Decimal,
    pub redirect: Route,
    /// Present when a payment gateway is configured and accepted the session.
    pub payment: Option<PaymentSession>,
}

/// The checkout flow for one visitor.
#[derive(Clone)]
pub struct Checkout {
    orders: OrderClient,
    payments: Option<Arc<dyn PaymentGateway>>,
    notifier: Notifier,
    state: Arc<Mutex<SubmissionState>>,
}

fn lock(state: &Mutex<SubmissionState>) -> MutexGuard<'_, SubmissionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the `Submitting` state; resets it to `Idle` unless [`finish`](Self::finish)
/// recorded an outcome first.
pub struct SubmissionGuard {
    state: Arc<Mutex<SubmissionState>>,
    finished: bool,
}

impl SubmissionGuard {
    fn finish(mut self, outcome: SubmissionState) {
        *lock(&self.state) = outcome;
        self.finished = true;
    }
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Checkout submission abandoned");
            *lock(&self.state) = SubmissionState::Idle;
        }
    }
}

impl Checkout {
    pub fn new(orders: OrderClient, notifier: Notifier) -> Self {
        Self {
            orders,
            payments: None,
            notifier,
            state: Arc::new(Mutex::new(SubmissionState::Idle)),
        }
    }

    pub fn with_payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payments = Some(gateway);
        self
    }

    pub fn state(&self) -> SubmissionState {
        *lock(&self.state)
    }

    fn begin(&self) -> Result<SubmissionGuard, CheckoutError> {
        let mut state = lock(&self.state);
        match *state {
            SubmissionState::Submitting => Err(CheckoutError::AlreadySubmitting),
            SubmissionState::Succeeded => Err(CheckoutError::AlreadyCompleted),
            SubmissionState::Idle | SubmissionState::Failed => {
                *state = SubmissionState::Submitting;
                Ok(SubmissionGuard {
                    state: self.state.clone(),
                    finished: false,
                })
            }
        }
    }

    /// Places an order for everything in `cart`.
    ///
    /// # Errors
    /// - `SignInRequired` / `EmptyCart` / `InvalidDetails`: nothing was sent
    /// - `AlreadySubmitting` / `AlreadyCompleted`: the call was ignored
    /// - `Order` / `OrphanedOrder`: the cart is left untouched and one
    ///   `OrderFailed` notification was raised
    #[instrument(skip_all, fields(items = cart.items().len()))]
    pub async fn submit(
        &self,
        cart: &mut CartStore,
        session: Option<&Session>,
        details: DeliveryDetails,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let Some(session) = session else {
            self.notifier.notify(Notification::SignInRequired);
            return Err(CheckoutError::SignInRequired);
        };
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        details.validate()?;

        let guard = self.begin()?;
        let total = cart.total_amount();

        match self.create_order(session, details, cart.items(), total).await {
            Ok(order_id) => {
                cart.clear_cart();
                info!(%order_id, %total, "Order placed");
                self.notifier.notify(Notification::OrderPlaced {
                    order_id: order_id.clone(),
                });
                guard.finish(SubmissionState::Succeeded);

                let payment = self.request_payment(session, &order_id, total).await;
                Ok(CheckoutReceipt {
                    order_id,
                    total,
                    redirect: Route::Profile,
                    payment,
                })
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed");
                self.notifier.notify(Notification::OrderFailed);
                guard.finish(SubmissionState::Failed);
                Err(e)
            }
        }
    }

    /// Inserts the header, then its lines; removes the header again if the
    /// lines are refused.
    async fn create_order(
        &self,
        session: &Session,
        details: DeliveryDetails,
        items: &[LineItem],
        total: Decimal,
    ) -> Result<String, CheckoutError> {
        let header = OrderCreate {
            user_id: session.user_id.clone(),
            customer_name: details.customer_name,
            customer_email: session.email.clone(),
            customer_phone: details.customer_phone,
            delivery_address: details.delivery_address,
            notes: details.notes.filter(|n| !n.trim().is_empty()),
            total_amount: total,
        };
        let order_id = self.orders.place(header).await?;

        let lines = items
            .iter()
            .map(|item| OrderItemCreate::from_line_item(&order_id, item))
            .collect();
        if let Err(source) = self.orders.add_items(lines).await {
            return match self.orders.discard(order_id.clone()).await {
                Ok(()) => Err(CheckoutError::Order(source)),
                Err(cleanup) => {
                    error!(%order_id, error = %cleanup, "Could not remove order without lines");
                    Err(CheckoutError::OrphanedOrder { order_id, source })
                }
            };
        }
        Ok(order_id)
    }

    async fn request_payment(&self, session: &Session, order_id: &str, total: Decimal) -> Option<PaymentSession> {
        let gateway = self.payments.as_ref()?;
        let amount = match to_minor_units(total) {
            Ok(amount) => amount,
            Err(e) => {
                warn!(%order_id, error = %e, "Payment skipped");
                return None;
            }
        };
        let request = PaymentRequest {
            order_id: order_id.to_string(),
            amount,
            customer_email: session.email.clone(),
        };
        match gateway.create_session(request).await {
            Ok(payment) => {
                info!(%order_id, session_id = %payment.session_id, "Payment session created");
                Some(payment)
            }
            Err(e) => {
                warn!(%order_id, error = %e, "Payment session failed; order stays pending");
                None
            }
        }
    }
}
