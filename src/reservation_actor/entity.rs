use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{ReservationAction, ReservationError};
use crate::framework::ActorEntity;
use crate::model::{
    Reservation, ReservationCreate, ReservationRequest, ReservationStatus, MAX_GUESTS, MIN_GUESTS,
};

/// Checks the booking form against the rules the form itself enforces.
///
/// `today` is passed in so tests can pin the calendar.
pub fn validate_request(request: &ReservationRequest, today: NaiveDate) -> Result<(), ReservationError> {
    let required = [
        ("name", &request.customer_name),
        ("email", &request.customer_email),
        ("phone", &request.customer_phone),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ReservationError::ValidationError(format!("{field} is required")));
        }
    }
    if !(MIN_GUESTS..=MAX_GUESTS).contains(&request.number_of_guests) {
        return Err(ReservationError::ValidationError(format!(
            "number of guests must be between {MIN_GUESTS} and {MAX_GUESTS}, got {}",
            request.number_of_guests
        )));
    }
    if request.reservation_date < today {
        return Err(ReservationError::ValidationError(format!(
            "reservation date {} is in the past",
            request.reservation_date
        )));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for Reservation {
    type Id = String;
    type Create = ReservationCreate;
    type Update = ();
    type Action = ReservationAction;
    type ActionResult = ReservationStatus;
    type Context = ();
    type Error = ReservationError;

    fn from_create_params(id: String, params: ReservationCreate) -> Result<Self, ReservationError> {
        if params.user_id.is_empty() {
            return Err(ReservationError::SignInRequired);
        }
        validate_request(&params.request, Utc::now().date_naive())?;

        let request = params.request;
        Ok(Self {
            id,
            user_id: params.user_id,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_phone: request.customer_phone,
            reservation_date: request.reservation_date,
            reservation_time: request.reservation_time,
            number_of_guests: request.number_of_guests,
            special_requests: request.special_requests.filter(|s| !s.trim().is_empty()),
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
        })
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), ReservationError> {
        Ok(())
    }

    /// `cancelled` is terminal; `pending` and `confirmed` move freely.
    async fn handle_action(
        &mut self,
        action: ReservationAction,
        _ctx: &(),
    ) -> Result<ReservationStatus, ReservationError> {
        match action {
            ReservationAction::Transition(to) => {
                if self.status == ReservationStatus::Cancelled && to != ReservationStatus::Cancelled {
                    return Err(ReservationError::InvalidTransition {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn request(guests: u32, date: NaiveDate) -> ReservationRequest {
        ReservationRequest {
            customer_name: "Ada".into(),
            customer_email: "ada@example.com".into(),
            customer_phone: "555-0100".into(),
            reservation_date: date,
            reservation_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            number_of_guests: guests,
            special_requests: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, d).unwrap()
    }

    #[test]
    fn test_guest_bounds() {
        let today = day(1);
        assert!(validate_request(&request(1, today), today).is_ok());
        assert!(validate_request(&request(20, today), today).is_ok());
        assert!(matches!(
            validate_request(&request(0, today), today),
            Err(ReservationError::ValidationError(_))
        ));
        assert!(matches!(
            validate_request(&request(21, today), today),
            Err(ReservationError::ValidationError(_))
        ));
    }

    #[test]
    fn test_past_dates_are_rejected() {
        assert!(validate_request(&request(2, day(9)), day(10)).is_err());
        assert!(validate_request(&request(2, day(10)), day(10)).is_ok());
    }

    #[test]
    fn test_blank_contact_fields_are_rejected() {
        let mut req = request(2, day(1));
        req.customer_phone = "  ".into();
        let err = validate_request(&req, day(1)).unwrap_err();
        assert_eq!(err, ReservationError::ValidationError("phone is required".into()));
    }

    #[tokio::test]
    async fn test_cancelled_is_terminal() {
        let mut reservation = Reservation::from_create_params(
            "reservation_1".into(),
            ReservationCreate {
                user_id: "user_1".into(),
                request: request(4, Utc::now().date_naive()),
            },
        )
        .unwrap();

        let status = reservation
            .handle_action(ReservationAction::Transition(ReservationStatus::Cancelled), &())
            .await
            .unwrap();
        assert_eq!(status, ReservationStatus::Cancelled);

        let err = reservation
            .handle_action(ReservationAction::Transition(ReservationStatus::Confirmed), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::InvalidTransition { .. }));
    }
}
