use std::sync::Arc;

use async_trait::async_trait;
use dao::MockTransaction;
use mockall::automock;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::booking::{BookingKind, LineItem};
use crate::discount::Discount;
use crate::package::{PackageDefinition, PackageItem};
use crate::ServiceError;

/// A line item which could not be priced. The booking totals skip it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineComputationWarning {
    pub service_id: Uuid,
    pub reason: Arc<str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingOutcome {
    pub line_items: Arc<[LineItem]>,
    pub base_amount: Decimal,
    pub total_amount: Decimal,
    pub warnings: Arc<[LineComputationWarning]>,
}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait PricingService {
    type Transaction: dao::Transaction;

    /// Line items of a package booking created without any. Base prices of
    /// zero are replaced by the catalog price.
    async fn populate_from_package(
        &self,
        package: &PackageDefinition,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[LineItem]>, ServiceError>;

    /// Prices every line and aggregates the booking totals. Package lines
    /// take their prices from `package_items`. Failures of a single line are
    /// reported as warnings, leave the line without any amounts and never
    /// abort the pricing.
    async fn price(
        &self,
        kind: BookingKind,
        line_items: &[LineItem],
        discount: &Discount,
        package_items: &[PackageItem],
        tx: Option<Self::Transaction>,
    ) -> Result<PricingOutcome, ServiceError>;
}
