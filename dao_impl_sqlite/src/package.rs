use std::sync::Arc;

use crate::{decimal_from_db, uuid_from_db, ResultDbErrorExt};
use async_trait::async_trait;
use dao::{
    package::{PackageDao, PackageDefinitionEntity, PackageItemEntity},
    DaoError,
};
use sqlx::query_as;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct PackageDefinitionDb {
    id: Vec<u8>,
    name: String,
    total_hours: String,
}

#[derive(sqlx::FromRow)]
struct PackageItemDb {
    service_id: Vec<u8>,
    quantity: String,
    base_price: String,
    package_price: String,
}

impl TryFrom<&PackageItemDb> for PackageItemEntity {
    type Error = DaoError;

    fn try_from(row: &PackageItemDb) -> Result<Self, Self::Error> {
        Ok(Self {
            service_id: uuid_from_db(&row.service_id)?,
            quantity: decimal_from_db(&row.quantity)?,
            base_price: decimal_from_db(&row.base_price)?,
            package_price: decimal_from_db(&row.package_price)?,
        })
    }
}

pub struct PackageDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl PackageDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl PackageDao for PackageDaoImpl {
    type Transaction = crate::TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<PackageDefinitionEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        let mut conn = tx.tx.lock().await;
        let Some(package) = query_as::<_, PackageDefinitionDb>(
            "SELECT id, name, total_hours FROM package_definition WHERE id = ?",
        )
        .bind(&id)
        .fetch_optional(conn.as_mut())
        .await
        .map_db_error()?
        else {
            return Ok(None);
        };

        let items = query_as::<_, PackageItemDb>(
            "SELECT service_id, quantity, base_price, package_price FROM package_item WHERE package_id = ? ORDER BY position",
        )
        .bind(&id)
        .fetch_all(conn.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(PackageItemEntity::try_from)
        .collect::<Result<Arc<[PackageItemEntity]>, DaoError>>()?;

        Ok(Some(PackageDefinitionEntity {
            id: uuid_from_db(&package.id)?,
            name: package.name.as_str().into(),
            total_hours: decimal_from_db(&package.total_hours)?,
            items,
        }))
    }
}
