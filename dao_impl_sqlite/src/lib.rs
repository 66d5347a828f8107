use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use dao::{DaoError, Transaction};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use time::{macros::format_description, Date, Time};
use tokio::sync::Mutex;
use uuid::Uuid;

pub mod booking;
pub mod catalog;
pub mod package;
pub mod resource_discount;
pub mod settings;

pub trait ResultDbErrorExt<T, E> {
    fn map_db_error(self) -> Result<T, DaoError>;
}
impl<T, E: std::error::Error + Send + Sync + 'static> ResultDbErrorExt<T, E> for Result<T, E> {
    fn map_db_error(self) -> Result<T, DaoError> {
        self.map_err(|err| DaoError::DatabaseQueryError(Box::new(err)))
    }
}

/// Applies all migrations shipped with this crate.
pub async fn migrate(pool: &SqlitePool) -> Result<(), DaoError> {
    sqlx::migrate!("../migrations/sqlite")
        .run(pool)
        .await
        .map_db_error()
}

pub(crate) fn uuid_from_db(bytes: &[u8]) -> Result<Uuid, DaoError> {
    Ok(Uuid::from_slice(bytes)?)
}

pub(crate) fn decimal_from_db(value: &str) -> Result<Decimal, DaoError> {
    Ok(Decimal::from_str(value)?)
}

pub(crate) fn optional_decimal_from_db(value: Option<&str>) -> Result<Option<Decimal>, DaoError> {
    value.map(decimal_from_db).transpose()
}

pub(crate) fn date_from_db(value: &str) -> Result<Date, DaoError> {
    Ok(Date::parse(value, format_description!("[year]-[month]-[day]"))?)
}

pub(crate) fn date_to_db(date: Date) -> Result<String, DaoError> {
    Ok(date.format(format_description!("[year]-[month]-[day]"))?)
}

pub(crate) fn time_from_db(value: Option<&str>) -> Result<Option<Time>, DaoError> {
    Ok(value
        .map(|value| Time::parse(value, format_description!("[hour]:[minute]:[second]")))
        .transpose()?)
}

pub(crate) fn time_to_db(time: Option<Time>) -> Result<Option<String>, DaoError> {
    Ok(time
        .map(|time| time.format(format_description!("[hour]:[minute]:[second]")))
        .transpose()?)
}

#[derive(Clone, Debug)]
pub struct TransactionImpl {
    tx: Arc<Mutex<sqlx::Transaction<'static, sqlx::Sqlite>>>,
}

impl Transaction for TransactionImpl {}

pub struct TransactionDaoImpl {
    pool: Arc<SqlitePool>,
}
impl TransactionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}
#[async_trait]
impl dao::TransactionDao for TransactionDaoImpl {
    type Transaction = TransactionImpl;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError> {
        let tx = self.pool.begin().await.map_db_error()?;
        Ok(TransactionImpl {
            tx: Arc::new(tx.into()),
        })
    }

    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError> {
        match tx {
            Some(tx) => Ok(tx),
            None => self.new_transaction().await,
        }
    }

    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError> {
        if let Some(tx) = Arc::into_inner(transaction.tx) {
            tx.into_inner().commit().await.map_db_error()?;
        }
        Ok(())
    }
}
