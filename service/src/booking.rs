use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dao::booking::{
    BookingEntity, BookingKindEntity, BookingStatusEntity, LineItemEntity, PaymentStatusEntity,
    SessionRowEntity,
};
use dao::MockTransaction;
use mockall::automock;
use rust_decimal::Decimal;
use studio_utils::{derive_from_reference, TimeRange, TimeRangeError};
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingKind {
    /// A single time slot on the requested date.
    Service,
    /// Several session rows drawing from the hours of a package.
    Package,
}
impl From<BookingKindEntity> for BookingKind {
    fn from(kind: BookingKindEntity) -> Self {
        match kind {
            BookingKindEntity::Service => Self::Service,
            BookingKindEntity::Package => Self::Package,
        }
    }
}
impl From<BookingKind> for BookingKindEntity {
    fn from(kind: BookingKind) -> Self {
        match kind {
            BookingKind::Service => Self::Service,
            BookingKind::Package => Self::Package,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}
impl From<BookingStatusEntity> for BookingStatus {
    fn from(status: BookingStatusEntity) -> Self {
        match status {
            BookingStatusEntity::Pending => Self::Pending,
            BookingStatusEntity::Confirmed => Self::Confirmed,
            BookingStatusEntity::Completed => Self::Completed,
            BookingStatusEntity::Cancelled => Self::Cancelled,
        }
    }
}
impl From<BookingStatus> for BookingStatusEntity {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Confirmed => Self::Confirmed,
            BookingStatus::Completed => Self::Completed,
            BookingStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}
impl From<PaymentStatusEntity> for PaymentStatus {
    fn from(status: PaymentStatusEntity) -> Self {
        match status {
            PaymentStatusEntity::Unpaid => Self::Unpaid,
            PaymentStatusEntity::PartiallyPaid => Self::PartiallyPaid,
            PaymentStatusEntity::Paid => Self::Paid,
        }
    }
}
impl From<PaymentStatus> for PaymentStatusEntity {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Unpaid => Self::Unpaid,
            PaymentStatus::PartiallyPaid => Self::PartiallyPaid,
            PaymentStatus::Paid => Self::Paid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub service_id: Uuid,
    /// Hours or count. `None` until given or derived.
    pub quantity: Option<Decimal>,
    pub base_price: Decimal,
    pub discounted_price: Decimal,
    pub package_price: Option<Decimal>,
    pub discount_amount: Decimal,
    pub amount: Decimal,
}
impl LineItem {
    pub fn for_service(service_id: Uuid, quantity: Option<Decimal>) -> Self {
        Self {
            service_id,
            quantity,
            base_price: Decimal::ZERO,
            discounted_price: Decimal::ZERO,
            package_price: None,
            discount_amount: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }

    /// Quantity used for merging and pricing. Missing or non positive
    /// quantities count as one unit.
    pub fn effective_quantity(&self) -> Decimal {
        match self.quantity {
            Some(quantity) if quantity > Decimal::ZERO => quantity,
            _ => Decimal::ONE,
        }
    }
}
impl From<&LineItemEntity> for LineItem {
    fn from(entity: &LineItemEntity) -> Self {
        Self {
            service_id: entity.service_id,
            quantity: entity.quantity,
            base_price: entity.base_price,
            discounted_price: entity.discounted_price,
            package_price: entity.package_price,
            discount_amount: entity.discount_amount,
            amount: entity.amount,
        }
    }
}
impl From<&LineItem> for LineItemEntity {
    fn from(item: &LineItem) -> Self {
        Self {
            service_id: item.service_id,
            quantity: item.quantity,
            base_price: item.base_price,
            discounted_price: item.discounted_price,
            package_price: item.package_price,
            discount_amount: item.discount_amount,
            amount: item.amount,
        }
    }
}
derive_from_reference!(LineItemEntity, LineItem);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub date: Date,
    pub from: Option<Time>,
    pub to: Option<Time>,
    /// Derived from `from` and `to`, never taken from input.
    pub hours: Option<Decimal>,
}
impl SessionRow {
    pub fn time_range(&self) -> Option<Result<TimeRange, TimeRangeError>> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some(TimeRange::on_date(self.date, from, to)),
            _ => None,
        }
    }
}
impl From<&SessionRowEntity> for SessionRow {
    fn from(entity: &SessionRowEntity) -> Self {
        Self {
            date: entity.date,
            from: entity.from,
            to: entity.to,
            hours: entity.hours,
        }
    }
}
impl From<&SessionRow> for SessionRowEntity {
    fn from(row: &SessionRow) -> Self {
        Self {
            date: row.date,
            from: row.from,
            to: row.to,
            hours: row.hours,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub kind: BookingKind,
    pub status: BookingStatus,
    pub resource_id: Option<Uuid>,
    pub package_id: Option<Uuid>,
    pub date: Date,
    pub from: Option<Time>,
    pub to: Option<Time>,
    pub session_rows: Arc<[SessionRow]>,
    pub line_items: Arc<[LineItem]>,
    pub base_amount: Decimal,
    pub total_amount: Decimal,
    pub deposit_percentage: Option<Decimal>,
    pub deposit_amount: Decimal,
    pub paid_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub used_hours: Option<Decimal>,
    pub remaining_hours: Option<Decimal>,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl Booking {
    /// Range of a service booking, `None` while a time is missing.
    pub fn time_range(&self) -> Option<Result<TimeRange, TimeRangeError>> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some(TimeRange::on_date(self.date, from, to)),
            _ => None,
        }
    }

    /// Ranges this booking blocks on the calendar of its resource on `date`.
    /// Incomplete or invalid times do not block anything.
    pub fn occupied_ranges_on(&self, date: Date) -> Vec<TimeRange> {
        match self.kind {
            BookingKind::Service if self.date == date => {
                self.time_range().and_then(Result::ok).into_iter().collect()
            }
            BookingKind::Service => Vec::new(),
            BookingKind::Package => self
                .session_rows
                .iter()
                .filter(|row| row.date == date)
                .filter_map(|row| row.time_range().and_then(Result::ok))
                .collect(),
        }
    }

    /// Amount the deposit and the payment status refer to.
    pub fn basis_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

impl From<&BookingEntity> for Booking {
    fn from(entity: &BookingEntity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind.into(),
            status: entity.status.into(),
            resource_id: entity.resource_id,
            package_id: entity.package_id,
            date: entity.date,
            from: entity.from,
            to: entity.to,
            session_rows: entity.session_rows.iter().map(SessionRow::from).collect(),
            line_items: entity.line_items.iter().map(LineItem::from).collect(),
            base_amount: entity.base_amount,
            total_amount: entity.total_amount,
            deposit_percentage: entity.deposit_percentage,
            deposit_amount: entity.deposit_amount,
            paid_amount: entity.paid_amount,
            payment_status: entity.payment_status.into(),
            used_hours: entity.used_hours,
            remaining_hours: entity.remaining_hours,
            created: Some(entity.created),
            deleted: entity.deleted,
            version: entity.version,
        }
    }
}
derive_from_reference!(BookingEntity, Booking);

impl TryFrom<&Booking> for BookingEntity {
    type Error = ServiceError;
    fn try_from(booking: &Booking) -> Result<Self, Self::Error> {
        Ok(Self {
            id: booking.id,
            kind: booking.kind.into(),
            status: booking.status.into(),
            resource_id: booking.resource_id,
            package_id: booking.package_id,
            date: booking.date,
            from: booking.from,
            to: booking.to,
            session_rows: booking
                .session_rows
                .iter()
                .map(SessionRowEntity::from)
                .collect(),
            line_items: booking.line_items.iter().map(LineItemEntity::from).collect(),
            base_amount: booking.base_amount,
            total_amount: booking.total_amount,
            deposit_percentage: booking.deposit_percentage,
            deposit_amount: booking.deposit_amount,
            paid_amount: booking.paid_amount,
            payment_status: booking.payment_status.into(),
            used_hours: booking.used_hours,
            remaining_hours: booking.remaining_hours,
            created: booking.created.ok_or(ServiceError::InternalError)?,
            deleted: booking.deleted,
            version: booking.version,
        })
    }
}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait BookingService {
    type Transaction: dao::Transaction;

    async fn get(&self, id: Uuid, tx: Option<Self::Transaction>)
        -> Result<Booking, ServiceError>;

    /// Runs the whole pipeline and returns the booking with every derived
    /// field filled in, without persisting anything.
    async fn validate(
        &self,
        booking: &Booking,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn create(
        &self,
        booking: &Booking,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn update(
        &self,
        booking: &Booking,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn cancel(&self, id: Uuid, tx: Option<Self::Transaction>)
        -> Result<Booking, ServiceError>;
}
