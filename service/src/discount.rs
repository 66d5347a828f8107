use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use dao::resource_discount::ResourceDiscountEntity;
use dao::MockTransaction;
use mockall::automock;
use rust_decimal::Decimal;
use studio_utils::clamp_percentage;
use uuid::Uuid;

use crate::ServiceError;

/// Discount a resource grants on the services it is allowed to discount.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Discount {
    pub percentage: Decimal,
    pub eligible_services: Arc<BTreeSet<Uuid>>,
}

impl Discount {
    pub fn none() -> Self {
        Self::default()
    }

    /// Resolves the discount of an optional resource. Resources without B2B
    /// pricing grant nothing, inactive services are never eligible.
    pub fn resolve(resource_discount: Option<&ResourceDiscountEntity>) -> Self {
        match resource_discount {
            Some(resource_discount) if resource_discount.b2b_enabled => Self {
                percentage: clamp_percentage(resource_discount.discount_percentage),
                eligible_services: Arc::new(
                    resource_discount
                        .eligible_services
                        .iter()
                        .filter(|service| service.active)
                        .map(|service| service.service_id)
                        .collect(),
                ),
            },
            _ => Self::none(),
        }
    }

    pub fn is_eligible(&self, service_id: Uuid) -> bool {
        self.percentage > Decimal::ZERO && self.eligible_services.contains(&service_id)
    }

    /// Percentage for the given service, zero if it is not eligible.
    pub fn percentage_for(&self, service_id: Uuid) -> Decimal {
        if self.is_eligible(service_id) {
            self.percentage
        } else {
            Decimal::ZERO
        }
    }
}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait DiscountService {
    type Transaction: dao::Transaction;

    async fn resolve(
        &self,
        resource_id: Option<Uuid>,
        tx: Option<Self::Transaction>,
    ) -> Result<Discount, ServiceError>;
}
