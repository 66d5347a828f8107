use std::sync::Arc;

use rust_decimal::Decimal;
use studio_utils::TimeRangeError;
use thiserror::Error;
use time::{Date, Time};
use uuid::Uuid;

pub mod availability;
pub mod booking;
pub mod capacity;
pub mod clock;
pub mod config;
pub mod deposit;
pub mod discount;
pub mod line_item;
pub mod package;
pub mod pricing;
pub mod resource_lock;
pub mod uuid_service;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationFailureItem {
    ModificationNotAllowed(Arc<str>),
    InvalidValue(Arc<str>),
    IdDoesNotExist(Arc<str>, Uuid),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] dao::DaoError),

    #[error("Entity {0} not found")]
    EntityNotFound(Uuid),

    #[error("Entity {0} conflicts, expected version {1} but got {2}")]
    EntityConflicts(Uuid, Uuid, Uuid),

    #[error("Validation error: {0:?}")]
    ValidationError(Arc<[ValidationFailureItem]>),

    #[error("ID cannot be set on create")]
    IdSetOnCreate,

    #[error("Version cannot be set on create")]
    VersionSetOnCreate,

    #[error("Created cannot be set on create")]
    CreatedSetOnCreate,

    #[error("Time order wrong on {0}. {2} must be after {1}")]
    TimeOrderWrong(Date, Time, Time),

    #[error(
        "Resource {resource_id} is already booked on {date} between {from} and {to} (booking {booking_id})"
    )]
    BookingConflict {
        resource_id: Uuid,
        booking_id: Uuid,
        date: Date,
        from: Time,
        to: Time,
    },

    #[error("Booked {used_hours} hours exceed the {allotted_hours} hours of the package")]
    CapacityExceeded {
        used_hours: Decimal,
        allotted_hours: Decimal,
    },

    #[error("Paid amount {paid} is {shortfall} below the required deposit of {required}")]
    DepositShortfall {
        paid: Decimal,
        required: Decimal,
        shortfall: Decimal,
    },

    #[error("Internal error")]
    InternalError,
}

impl From<TimeRangeError> for ServiceError {
    fn from(err: TimeRangeError) -> Self {
        match err {
            TimeRangeError::TimeOrder(start, end) => {
                ServiceError::TimeOrderWrong(start.date(), start.time(), end.time())
            }
            TimeRangeError::DateOutOfRange(_) => {
                ServiceError::ValidationError(Arc::new([ValidationFailureItem::InvalidValue(
                    "date".into(),
                )]))
            }
        }
    }
}
