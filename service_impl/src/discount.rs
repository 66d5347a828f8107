use async_trait::async_trait;
use dao::{resource_discount::ResourceDiscountDao, TransactionDao};
use service::{
    discount::{Discount, DiscountService},
    ServiceError,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct DiscountServiceImpl: DiscountService = DiscountServiceDeps {
        ResourceDiscountDao: ResourceDiscountDao<Transaction = Self::Transaction> = resource_discount_dao,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

#[async_trait]
impl<Deps: DiscountServiceDeps> DiscountService for DiscountServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    #[instrument(skip(self))]
    async fn resolve(
        &self,
        resource_id: Option<Uuid>,
        tx: Option<Self::Transaction>,
    ) -> Result<Discount, ServiceError> {
        let Some(resource_id) = resource_id else {
            return Ok(Discount::none());
        };
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let resource_discount = self
            .resource_discount_dao
            .find_by_resource_id(resource_id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        let discount = Discount::resolve(resource_discount.as_ref());
        debug!(
            percentage = %discount.percentage,
            eligible = discount.eligible_services.len(),
            "Resolved discount"
        );
        Ok(discount)
    }
}
