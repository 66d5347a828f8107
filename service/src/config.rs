use async_trait::async_trait;
use dao::MockTransaction;
use mockall::automock;
use rust_decimal::Decimal;

use crate::ServiceError;

/// Tunables of the booking pipeline, read once per save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfig {
    pub default_deposit_percentage: Decimal,
    pub minimum_booking_amount: Decimal,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_deposit_percentage: Decimal::from(30),
            minimum_booking_amount: Decimal::ZERO,
        }
    }
}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait ConfigService {
    type Transaction: dao::Transaction;

    async fn get_config(&self, tx: Option<Self::Transaction>)
        -> Result<BookingConfig, ServiceError>;
}
