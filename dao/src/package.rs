use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageItemEntity {
    pub service_id: Uuid,
    pub quantity: Decimal,
    pub base_price: Decimal,
    pub package_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageDefinitionEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub total_hours: Decimal,
    pub items: Arc<[PackageItemEntity]>,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait PackageDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<PackageDefinitionEntity>, DaoError>;
}
