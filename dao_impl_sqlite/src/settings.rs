use std::sync::Arc;

use crate::ResultDbErrorExt;
use async_trait::async_trait;
use dao::{settings::SettingsDao, DaoError};
use sqlx::query_scalar;

pub struct SettingsDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl SettingsDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl SettingsDao for SettingsDaoImpl {
    type Transaction = crate::TransactionImpl;

    async fn get_value(
        &self,
        key: &str,
        tx: Self::Transaction,
    ) -> Result<Option<Arc<str>>, DaoError> {
        Ok(
            query_scalar::<_, String>("SELECT value FROM setting WHERE key = ?")
                .bind(key)
                .fetch_optional(tx.tx.lock().await.as_mut())
                .await
                .map_db_error()?
                .map(Arc::from),
        )
    }
}
