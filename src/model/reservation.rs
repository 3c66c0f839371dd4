use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Smallest party the booking form accepts.
pub const MIN_GUESTS: u32 = 1;
/// Largest party the booking form accepts.
pub const MAX_GUESTS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table booking.
///
/// # Table
/// Stored in the reservations table; see [`crate::reservation_actor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub reservation_date: NaiveDate,
    pub reservation_time: NaiveTime,
    pub number_of_guests: u32,
    pub special_requests: Option<String>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

/// What the booking form collects. The user id comes from the session.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub reservation_date: NaiveDate,
    pub reservation_time: NaiveTime,
    pub number_of_guests: u32,
    pub special_requests: Option<String>,
}

/// Payload for inserting a reservation row.
#[derive(Debug, Clone)]
pub struct ReservationCreate {
    pub user_id: String,
    pub request: ReservationRequest,
}
