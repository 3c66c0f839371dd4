//! Reservations table.

pub mod entity;
pub mod error;

pub use entity::validate_request;
pub use error::*;

use crate::clients::ReservationClient;
use crate::framework::ResourceActor;
use crate::model::{Reservation, ReservationStatus};
use crate::notify::Notifier;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    /// Admin status change (`pending` → `confirmed`, or a cancellation).
    Transition(ReservationStatus),
}

/// Creates the reservations table and its client.
pub fn new(buffer_size: usize, notifier: Notifier) -> (ResourceActor<Reservation>, ReservationClient) {
    let reservation_id_counter = Arc::new(AtomicU64::new(1));
    let next_reservation_id = move || {
        let id = reservation_id_counter.fetch_add(1, Ordering::SeqCst);
        format!("reservation_{}", id)
    };

    let (actor, generic_client) = ResourceActor::new(buffer_size, next_reservation_id);
    (actor, ReservationClient::new(generic_client, notifier))
}
