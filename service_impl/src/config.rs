use std::str::FromStr;

use async_trait::async_trait;
use dao::{
    settings::{SettingsDao, DEFAULT_DEPOSIT_PERCENTAGE_KEY, MINIMUM_BOOKING_AMOUNT_KEY},
    TransactionDao,
};
use rust_decimal::Decimal;
use service::{
    config::{BookingConfig, ConfigService},
    ServiceError,
};
use tracing::warn;

use crate::gen_service_impl;

gen_service_impl! {
    struct ConfigServiceImpl: ConfigService = ConfigServiceDeps {
        SettingsDao: SettingsDao<Transaction = Self::Transaction> = settings_dao,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

impl<Deps: ConfigServiceDeps> ConfigServiceImpl<Deps> {
    async fn read_decimal(
        &self,
        key: &str,
        default: Decimal,
        tx: Deps::Transaction,
    ) -> Result<Decimal, ServiceError> {
        Ok(match self.settings_dao.get_value(key, tx).await? {
            Some(value) => Decimal::from_str(value.trim()).unwrap_or_else(|err| {
                warn!(key, value = %value, "Invalid setting, using {}: {}", default, err);
                default
            }),
            None => default,
        })
    }
}

#[async_trait]
impl<Deps: ConfigServiceDeps> ConfigService for ConfigServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    async fn get_config(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<BookingConfig, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let defaults = BookingConfig::default();
        let default_deposit_percentage = self
            .read_decimal(
                DEFAULT_DEPOSIT_PERCENTAGE_KEY,
                defaults.default_deposit_percentage,
                tx.clone(),
            )
            .await?;
        let minimum_booking_amount = self
            .read_decimal(
                MINIMUM_BOOKING_AMOUNT_KEY,
                defaults.minimum_booking_amount,
                tx.clone(),
            )
            .await?;
        self.transaction_dao.commit(tx).await?;

        Ok(BookingConfig {
            default_deposit_percentage,
            minimum_booking_amount,
        })
    }
}
