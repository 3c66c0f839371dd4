//! # Payment Sessions
//!
//! Boundary to the external payment provider. The core only ever asks for a
//! checkout session for one order and gets back an opaque session id; there is
//! no retry logic on this side of the boundary.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The amount can't be charged (negative, or too large for minor units).
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),

    /// The provider answered with an error payload.
    #[error("Payment provider rejected the session: {0}")]
    Rejected(String),
}

/// What the provider needs to open a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub order_id: String,
    /// Amount in minor currency units (cents).
    pub amount: i64,
    pub customer_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub session_id: String,
}

/// Converts a currency amount into minor units, rounding half away from zero.
pub fn to_minor_units(amount: Decimal) -> Result<i64, PaymentError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PaymentError::InvalidAmount(amount.to_string()));
    }
    amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| PaymentError::InvalidAmount(amount.to_string()))
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, request: PaymentRequest) -> Result<PaymentSession, PaymentError>;
}

/// In-process gateway that records every request and hands out `cs_<n>` ids.
#[derive(Debug, Clone, Default)]
pub struct MemoryPaymentGateway {
    requests: Arc<Mutex<Vec<PaymentRequest>>>,
    counter: Arc<AtomicU64>,
    reject: Arc<AtomicBool>,
}

impl MemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent session request fail until switched back.
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PaymentGateway for MemoryPaymentGateway {
    #[instrument(skip(self, request), fields(order_id = %request.order_id, amount = request.amount))]
    async fn create_session(&self, request: PaymentRequest) -> Result<PaymentSession, PaymentError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if self.reject.load(Ordering::SeqCst) {
            warn!("Payment session rejected");
            return Err(PaymentError::Rejected("card payments unavailable".to_string()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let session = PaymentSession {
            session_id: format!("cs_{n}"),
        };
        info!(session_id = %session.session_id, "Payment session created");
        Ok(session)
    }
}
