use std::sync::Arc;

use dao::package::{PackageDefinitionEntity, PackageItemEntity};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageItem {
    pub service_id: Uuid,
    pub quantity: Decimal,
    /// Unit price before discounts. Zero means the catalog price applies.
    pub base_price: Decimal,
    pub package_price: Decimal,
}
impl From<&PackageItemEntity> for PackageItem {
    fn from(entity: &PackageItemEntity) -> Self {
        Self {
            service_id: entity.service_id,
            quantity: entity.quantity,
            base_price: entity.base_price,
            package_price: entity.package_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDefinition {
    pub id: Uuid,
    pub name: Arc<str>,
    pub total_hours: Decimal,
    pub items: Arc<[PackageItem]>,
}
impl From<&PackageDefinitionEntity> for PackageDefinition {
    fn from(entity: &PackageDefinitionEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            total_hours: entity.total_hours,
            items: entity.items.iter().map(PackageItem::from).collect(),
        }
    }
}
