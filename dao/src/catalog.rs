use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PricingUnitEntity {
    Duration,
    Quantity,
}
impl PricingUnitEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duration => "duration",
            Self::Quantity => "quantity",
        }
    }
}
impl TryFrom<&str> for PricingUnitEntity {
    type Error = DaoError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "duration" => Ok(Self::Duration),
            "quantity" => Ok(Self::Quantity),
            other => Err(DaoError::InvalidEnumValue("pricing unit", other.into())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceCatalogEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub base_price: Decimal,
    pub unit: PricingUnitEntity,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait CatalogDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ServiceCatalogEntity>, DaoError>;
}
