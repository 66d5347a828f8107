use std::sync::Arc;

use crate::{decimal_from_db, uuid_from_db, ResultDbErrorExt};
use async_trait::async_trait;
use dao::{
    resource_discount::{EligibleServiceEntity, ResourceDiscountDao, ResourceDiscountEntity},
    DaoError,
};
use sqlx::query_as;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct ResourceDiscountDb {
    resource_id: Vec<u8>,
    discount_percentage: String,
    b2b_enabled: bool,
}

#[derive(sqlx::FromRow)]
struct EligibleServiceDb {
    service_id: Vec<u8>,
    active: bool,
}

impl TryFrom<&EligibleServiceDb> for EligibleServiceEntity {
    type Error = DaoError;

    fn try_from(row: &EligibleServiceDb) -> Result<Self, Self::Error> {
        Ok(Self {
            service_id: uuid_from_db(&row.service_id)?,
            active: row.active,
        })
    }
}

pub struct ResourceDiscountDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl ResourceDiscountDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl ResourceDiscountDao for ResourceDiscountDaoImpl {
    type Transaction = crate::TransactionImpl;

    async fn find_by_resource_id(
        &self,
        resource_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ResourceDiscountEntity>, DaoError> {
        let resource_id = resource_id.as_bytes().to_vec();
        let mut conn = tx.tx.lock().await;
        let Some(discount) = query_as::<_, ResourceDiscountDb>(
            "SELECT resource_id, discount_percentage, b2b_enabled FROM resource_discount WHERE resource_id = ?",
        )
        .bind(&resource_id)
        .fetch_optional(conn.as_mut())
        .await
        .map_db_error()?
        else {
            return Ok(None);
        };

        let eligible_services = query_as::<_, EligibleServiceDb>(
            "SELECT service_id, active FROM resource_discount_service WHERE resource_id = ?",
        )
        .bind(&resource_id)
        .fetch_all(conn.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(EligibleServiceEntity::try_from)
        .collect::<Result<Arc<[EligibleServiceEntity]>, DaoError>>()?;

        Ok(Some(ResourceDiscountEntity {
            resource_id: uuid_from_db(&discount.resource_id)?,
            discount_percentage: decimal_from_db(&discount.discount_percentage)?,
            b2b_enabled: discount.b2b_enabled,
            eligible_services,
        }))
    }
}
