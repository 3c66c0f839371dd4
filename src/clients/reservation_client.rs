use crate::clients::actor_client::{recover_error, ActorClient};
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{Reservation, ReservationCreate, ReservationRequest, ReservationStatus, Session};
use crate::notify::{Notification, Notifier};
use crate::reservation_actor::{ReservationAction, ReservationError};
use async_trait::async_trait;
use std::cmp::Reverse;
use tracing::{info, instrument, warn};

/// Client for the reservations table.
#[derive(Clone)]
pub struct ReservationClient {
    inner: ResourceClient<Reservation>,
    notifier: Notifier,
}

impl ReservationClient {
    pub fn new(inner: ResourceClient<Reservation>, notifier: Notifier) -> Self {
        Self { inner, notifier }
    }

    /// Books a table for the signed-in visitor.
    ///
    /// Every outcome raises exactly one notification: `SignInRequired` without a
    /// session, `ReservationSubmitted` on success and `ReservationFailed` otherwise.
    #[instrument(skip(self, session, request), fields(guests = request.number_of_guests))]
    pub async fn book(
        &self,
        session: Option<&Session>,
        request: ReservationRequest,
    ) -> Result<String, ReservationError> {
        let Some(session) = session else {
            warn!("Reservation attempted without a session");
            self.notifier.notify(Notification::SignInRequired);
            return Err(ReservationError::SignInRequired);
        };

        let payload = ReservationCreate {
            user_id: session.user_id.clone(),
            request,
        };
        match self.inner.create(payload).await.map_err(Self::map_error) {
            Ok(id) => {
                info!(reservation_id = %id, "Reservation submitted");
                self.notifier.notify(Notification::ReservationSubmitted {
                    reservation_id: id.clone(),
                });
                Ok(id)
            }
            Err(e) => {
                warn!(error = %e, "Reservation failed");
                self.notifier.notify(Notification::ReservationFailed);
                Err(e)
            }
        }
    }

    /// A user's reservations, latest date and time first.
    pub async fn reservations_for_user(&self, user_id: &str) -> Result<Vec<Reservation>, ReservationError> {
        let user_id = user_id.to_string();
        let mut rows = self
            .inner
            .list(move |r: &Reservation| r.user_id == user_id)
            .await
            .map_err(Self::map_error)?;
        rows.sort_by_key(|r| Reverse((r.reservation_date, r.reservation_time)));
        Ok(rows)
    }

    /// Every reservation, earliest date and time first (the admin dashboard).
    pub async fn all_reservations(&self) -> Result<Vec<Reservation>, ReservationError> {
        let mut rows = self.inner.list(|_| true).await.map_err(Self::map_error)?;
        rows.sort_by_key(|r| (r.reservation_date, r.reservation_time));
        Ok(rows)
    }

    /// Confirms or cancels a reservation. Admin only.
    #[instrument(skip(self, session))]
    pub async fn update_status(
        &self,
        session: &Session,
        reservation_id: String,
        status: ReservationStatus,
    ) -> Result<ReservationStatus, ReservationError> {
        if !session.is_admin {
            warn!(user_id = %session.user_id, "Status change refused for non-admin");
            return Err(ReservationError::AdminRequired);
        }
        let status = self
            .inner
            .perform_action(reservation_id.clone(), ReservationAction::Transition(status))
            .await
            .map_err(Self::map_error)?;
        info!(%status, "Reservation status updated");
        self.notifier.notify(Notification::StatusUpdated {
            resource: "Reservation",
            id: reservation_id,
            status: status.to_string(),
        });
        Ok(status)
    }
}

#[async_trait]
impl ActorClient<Reservation> for ReservationClient {
    type Error = ReservationError;

    fn inner(&self) -> &ResourceClient<Reservation> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover_error(e, ReservationError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockClient;
    use crate::notify::drain;
    use chrono::{NaiveTime, Utc};

    fn request() -> ReservationRequest {
        ReservationRequest {
            customer_name: "Ada".into(),
            customer_email: "ada@example.com".into(),
            customer_phone: "555-0100".into(),
            reservation_date: Utc::now().date_naive(),
            reservation_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            number_of_guests: 2,
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn test_booking_without_session_is_refused() {
        let mock = MockClient::<Reservation>::new();
        let notifier = Notifier::default();
        let mut seen = notifier.subscribe();
        let client = ReservationClient::new(mock.client(), notifier);

        let err = client.book(None, request()).await.unwrap_err();

        assert_eq!(err, ReservationError::SignInRequired);
        assert_eq!(drain(&mut seen), vec![Notification::SignInRequired]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_store_failure_raises_one_failure_notification() {
        let mut mock = MockClient::<Reservation>::new();
        mock.expect_create().return_err(FrameworkError::ActorClosed);
        let notifier = Notifier::default();
        let mut seen = notifier.subscribe();
        let client = ReservationClient::new(mock.client(), notifier);
        let session = Session::customer("user_1", "ada@example.com");

        let err = client.book(Some(&session), request()).await.unwrap_err();

        assert!(matches!(err, ReservationError::ActorCommunicationError(_)));
        assert_eq!(drain(&mut seen), vec![Notification::ReservationFailed]);
        mock.verify();
    }
}
