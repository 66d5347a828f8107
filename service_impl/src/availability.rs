use async_trait::async_trait;
use dao::{booking::BookingDao, TransactionDao};
use service::{
    availability::AvailabilityService,
    booking::{Booking, BookingKind},
    ServiceError,
};
use studio_utils::TimeRange;
use time::Date;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct AvailabilityServiceImpl: AvailabilityService = AvailabilityServiceDeps {
        BookingDao: BookingDao<Transaction = Self::Transaction> = booking_dao,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

/// Ranges the booking wants to occupy, together with the date they are
/// booked on.
fn requested_ranges(booking: &Booking) -> Result<Vec<(Date, TimeRange)>, ServiceError> {
    match booking.kind {
        BookingKind::Service => Ok(booking
            .time_range()
            .transpose()?
            .map(|range| (booking.date, range))
            .into_iter()
            .collect()),
        BookingKind::Package => {
            let mut ranges = Vec::with_capacity(booking.session_rows.len());
            for row in booking.session_rows.iter() {
                if let Some(range) = row.time_range().transpose()? {
                    ranges.push((row.date, range));
                }
            }
            Ok(ranges)
        }
    }
}

#[async_trait]
impl<Deps: AvailabilityServiceDeps> AvailabilityService for AvailabilityServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    #[instrument(skip(self))]
    async fn check_available(
        &self,
        resource_id: Uuid,
        date: Date,
        range: TimeRange,
        exclude_booking_id: Option<Uuid>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let bookings = self
            .booking_dao
            .find_by_resource_and_date(resource_id, date, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        let conflict = bookings
            .iter()
            .map(Booking::from)
            .filter(|booking| booking.deleted.is_none() && !booking.is_cancelled())
            .filter(|booking| Some(booking.id) != exclude_booking_id)
            .find(|booking| {
                booking
                    .occupied_ranges_on(date)
                    .iter()
                    .any(|occupied| occupied.overlaps(&range))
            });

        match conflict {
            Some(booking) => {
                warn!(
                    conflicting_booking = %booking.id,
                    "Requested time {} collides with an existing booking", range
                );
                Err(ServiceError::BookingConflict {
                    resource_id,
                    booking_id: booking.id,
                    date,
                    from: range.start().time(),
                    to: range.end().time(),
                })
            }
            None => {
                debug!("No conflicting booking found");
                Ok(())
            }
        }
    }

    #[instrument(skip(self))]
    async fn check_booking(
        &self,
        booking: &Booking,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        let Some(resource_id) = booking.resource_id else {
            return Ok(());
        };
        if booking.is_cancelled() {
            return Ok(());
        }
        let ranges = requested_ranges(booking)?;

        // Session rows of the same booking must not overlap each other.
        for (index, (date, range)) in ranges.iter().enumerate() {
            if let Some((_, other)) = ranges
                .iter()
                .skip(index + 1)
                .find(|(_, other)| other.overlaps(range))
            {
                return Err(ServiceError::BookingConflict {
                    resource_id,
                    booking_id: booking.id,
                    date: *date,
                    from: other.start().time(),
                    to: other.end().time(),
                });
            }
        }

        let exclude_booking_id = Some(booking.id).filter(|id| !id.is_nil());
        let tx = self.transaction_dao.use_transaction(tx).await?;
        for (date, range) in ranges {
            self.check_available(resource_id, date, range, exclude_booking_id, Some(tx.clone()))
                .await?;
        }
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}
