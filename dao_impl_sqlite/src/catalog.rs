use std::sync::Arc;

use crate::{decimal_from_db, uuid_from_db, ResultDbErrorExt};
use async_trait::async_trait;
use dao::{
    catalog::{CatalogDao, PricingUnitEntity, ServiceCatalogEntity},
    DaoError,
};
use sqlx::query_as;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct ServiceCatalogDb {
    id: Vec<u8>,
    name: String,
    base_price: String,
    unit: String,
}

impl TryFrom<&ServiceCatalogDb> for ServiceCatalogEntity {
    type Error = DaoError;

    fn try_from(row: &ServiceCatalogDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_db(&row.id)?,
            name: row.name.as_str().into(),
            base_price: decimal_from_db(&row.base_price)?,
            unit: PricingUnitEntity::try_from(row.unit.as_str())?,
        })
    }
}

pub struct CatalogDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl CatalogDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl CatalogDao for CatalogDaoImpl {
    type Transaction = crate::TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ServiceCatalogEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        query_as::<_, ServiceCatalogDb>(
            "SELECT id, name, base_price, unit FROM service_catalog WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(ServiceCatalogEntity::try_from)
        .transpose()
    }
}
