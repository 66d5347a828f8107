use std::sync::Arc;

use mockall::automock;
use rust_decimal::Decimal;

use crate::booking::SessionRow;
use crate::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityUsage {
    pub session_rows: Arc<[SessionRow]>,
    pub used_hours: Decimal,
    pub remaining_hours: Decimal,
}

#[automock]
pub trait CapacityService {
    /// Derives the hours of every session row and sums them up. Exceeding
    /// `total_hours` fails with `ServiceError::CapacityExceeded`.
    fn compute_usage(
        &self,
        session_rows: &[SessionRow],
        total_hours: Decimal,
    ) -> Result<CapacityUsage, ServiceError>;
}
