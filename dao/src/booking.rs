use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingKindEntity {
    Service,
    Package,
}
impl BookingKindEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Package => "package",
        }
    }
}
impl TryFrom<&str> for BookingKindEntity {
    type Error = DaoError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "service" => Ok(Self::Service),
            "package" => Ok(Self::Package),
            other => Err(DaoError::InvalidEnumValue("booking kind", other.into())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingStatusEntity {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}
impl BookingStatusEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}
impl TryFrom<&str> for BookingStatusEntity {
    type Error = DaoError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DaoError::InvalidEnumValue("booking status", other.into())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentStatusEntity {
    Unpaid,
    PartiallyPaid,
    Paid,
}
impl PaymentStatusEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
        }
    }
}
impl TryFrom<&str> for PaymentStatusEntity {
    type Error = DaoError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "unpaid" => Ok(Self::Unpaid),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "paid" => Ok(Self::Paid),
            other => Err(DaoError::InvalidEnumValue("payment status", other.into())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItemEntity {
    pub service_id: Uuid,
    pub quantity: Option<Decimal>,
    pub base_price: Decimal,
    pub discounted_price: Decimal,
    pub package_price: Option<Decimal>,
    pub discount_amount: Decimal,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRowEntity {
    pub date: Date,
    pub from: Option<Time>,
    pub to: Option<Time>,
    pub hours: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingEntity {
    pub id: Uuid,
    pub kind: BookingKindEntity,
    pub status: BookingStatusEntity,
    pub resource_id: Option<Uuid>,
    pub package_id: Option<Uuid>,
    pub date: Date,
    pub from: Option<Time>,
    pub to: Option<Time>,
    pub session_rows: Arc<[SessionRowEntity]>,
    pub line_items: Arc<[LineItemEntity]>,
    pub base_amount: Decimal,
    pub total_amount: Decimal,
    pub deposit_percentage: Option<Decimal>,
    pub deposit_amount: Decimal,
    pub paid_amount: Decimal,
    pub payment_status: PaymentStatusEntity,
    pub used_hours: Option<Decimal>,
    pub remaining_hours: Option<Decimal>,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait BookingDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BookingEntity>, DaoError>;

    /// All bookings of the resource which occupy time on `date`, either by
    /// their requested date or by one of their session rows.
    async fn find_by_resource_and_date(
        &self,
        resource_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;

    async fn create(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    async fn update(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
