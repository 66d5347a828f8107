use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EligibleServiceEntity {
    pub service_id: Uuid,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceDiscountEntity {
    pub resource_id: Uuid,
    pub discount_percentage: Decimal,
    pub b2b_enabled: bool,
    pub eligible_services: Arc<[EligibleServiceEntity]>,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ResourceDiscountDao {
    type Transaction: crate::Transaction;

    async fn find_by_resource_id(
        &self,
        resource_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ResourceDiscountEntity>, DaoError>;
}
