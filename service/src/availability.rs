use async_trait::async_trait;
use dao::MockTransaction;
use mockall::automock;
use studio_utils::TimeRange;
use time::Date;
use uuid::Uuid;

use crate::booking::Booking;
use crate::ServiceError;

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait AvailabilityService {
    type Transaction: dao::Transaction;

    /// Fails with `ServiceError::BookingConflict` naming the first booking of
    /// the resource which is not cancelled, is not `exclude_booking_id` and
    /// overlaps `range` on `date`.
    async fn check_available(
        &self,
        resource_id: Uuid,
        date: Date,
        range: TimeRange,
        exclude_booking_id: Option<Uuid>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;

    /// Checks every range the booking occupies. The booking itself is
    /// excluded by its id.
    async fn check_booking(
        &self,
        booking: &Booking,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
}
