use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::DaoError;

pub const DEFAULT_DEPOSIT_PERCENTAGE_KEY: &str = "default_deposit_percentage";
pub const MINIMUM_BOOKING_AMOUNT_KEY: &str = "minimum_booking_amount";

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait SettingsDao {
    type Transaction: crate::Transaction;

    async fn get_value(&self, key: &str, tx: Self::Transaction)
        -> Result<Option<Arc<str>>, DaoError>;
}
