use std::sync::Arc;

use async_trait::async_trait;
use dao::{catalog::CatalogDao, DaoError, TransactionDao};
use rust_decimal::Decimal;
use service::{
    booking::{BookingKind, LineItem},
    discount::Discount,
    package::{PackageDefinition, PackageItem},
    pricing::{LineComputationWarning, PricingOutcome, PricingService},
    ServiceError,
};
use studio_utils::round_money;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct PricingServiceImpl: PricingService = PricingServiceDeps {
        CatalogDao: CatalogDao<Transaction = Self::Transaction> = catalog_dao,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

#[derive(Debug, Error)]
enum LinePricingError {
    #[error("service {0} is not in the catalog")]
    UnknownService(Uuid),

    #[error("catalog lookup failed: {0}")]
    Lookup(#[from] DaoError),

    #[error("amount out of range")]
    Overflow,
}

struct PricedLine {
    item: LineItem,
    line_base: Decimal,
}

fn checked_percentage(value: Decimal, percentage: Decimal) -> Result<Decimal, LinePricingError> {
    value
        .checked_mul(percentage)
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(LinePricingError::Overflow)
}

fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, LinePricingError> {
    a.checked_mul(b).ok_or(LinePricingError::Overflow)
}

impl<Deps: PricingServiceDeps> PricingServiceImpl<Deps> {
    async fn catalog_price(
        &self,
        service_id: Uuid,
        tx: Deps::Transaction,
    ) -> Result<Decimal, LinePricingError> {
        self.catalog_dao
            .find_by_id(service_id, tx)
            .await?
            .map(|entry| entry.base_price)
            .ok_or(LinePricingError::UnknownService(service_id))
    }

    /// Base price of the package definition, the catalog price if the
    /// definition has none.
    async fn package_base_price(
        &self,
        service_id: Uuid,
        package_item: Option<&PackageItem>,
        tx: Deps::Transaction,
    ) -> Result<Decimal, LinePricingError> {
        match package_item {
            Some(package_item) if package_item.base_price > Decimal::ZERO => {
                Ok(package_item.base_price)
            }
            _ => self.catalog_price(service_id, tx).await,
        }
    }

    /// Unit price from the catalog, reduced by the discount if the service
    /// is eligible.
    async fn price_service_line(
        &self,
        item: &LineItem,
        discount: &Discount,
        tx: Deps::Transaction,
    ) -> Result<PricedLine, LinePricingError> {
        let quantity = item.effective_quantity();
        let base_price = self.catalog_price(item.service_id, tx).await?;
        let unit_discount =
            checked_percentage(base_price, discount.percentage_for(item.service_id))?;
        let discounted_price = (base_price - unit_discount).max(Decimal::ZERO);
        let line_base = checked_mul(base_price, quantity)?;
        let amount = checked_mul(discounted_price, quantity)?;

        Ok(PricedLine {
            item: LineItem {
                quantity: Some(quantity),
                base_price,
                discounted_price,
                package_price: None,
                discount_amount: line_base - amount,
                amount,
                ..item.clone()
            },
            line_base,
        })
    }

    /// Prices come from the package definition, only the quantity is taken
    /// from the line. Discount is taken from the line total instead of the
    /// unit price.
    async fn price_package_line(
        &self,
        item: &LineItem,
        discount: &Discount,
        package_items: &[PackageItem],
        tx: Deps::Transaction,
    ) -> Result<PricedLine, LinePricingError> {
        let quantity = item.effective_quantity();
        let package_item = package_items
            .iter()
            .find(|package_item| package_item.service_id == item.service_id);
        let base_price = self
            .package_base_price(item.service_id, package_item, tx)
            .await?;
        let line_base = checked_mul(base_price, quantity)?;
        let discount_amount =
            checked_percentage(line_base, discount.percentage_for(item.service_id))?;
        let amount = (line_base - discount_amount).max(Decimal::ZERO);
        let discounted_price = amount
            .checked_div(quantity)
            .ok_or(LinePricingError::Overflow)?;

        Ok(PricedLine {
            item: LineItem {
                quantity: Some(quantity),
                base_price,
                discounted_price,
                package_price: package_item.map(|package_item| package_item.package_price),
                discount_amount,
                amount,
                ..item.clone()
            },
            line_base,
        })
    }
}

#[async_trait]
impl<Deps: PricingServiceDeps> PricingService for PricingServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    #[instrument(skip(self))]
    async fn populate_from_package(
        &self,
        package: &PackageDefinition,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[LineItem]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut line_items = Vec::with_capacity(package.items.len());
        for package_item in package.items.iter() {
            let base_price = self
                .package_base_price(package_item.service_id, Some(package_item), tx.clone())
                .await
                .unwrap_or_else(|err| {
                    warn!(service_id = %package_item.service_id, "No base price: {}", err);
                    Decimal::ZERO
                });
            line_items.push(LineItem {
                service_id: package_item.service_id,
                quantity: Some(package_item.quantity),
                base_price,
                discounted_price: base_price,
                package_price: Some(package_item.package_price),
                discount_amount: Decimal::ZERO,
                amount: Decimal::ZERO,
            });
        }
        self.transaction_dao.commit(tx).await?;
        Ok(line_items.into())
    }

    #[instrument(skip(self, line_items, package_items))]
    async fn price(
        &self,
        kind: BookingKind,
        line_items: &[LineItem],
        discount: &Discount,
        package_items: &[PackageItem],
        tx: Option<Self::Transaction>,
    ) -> Result<PricingOutcome, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut priced = Vec::with_capacity(line_items.len());
        let mut warnings = Vec::new();
        let mut base_amount = Decimal::ZERO;
        let mut total_amount = Decimal::ZERO;

        for item in line_items {
            let line = match kind {
                BookingKind::Service => self.price_service_line(item, discount, tx.clone()).await,
                BookingKind::Package => {
                    self.price_package_line(item, discount, package_items, tx.clone())
                        .await
                }
            }
            .and_then(|line| {
                let base = base_amount.checked_add(line.line_base);
                let total = total_amount.checked_add(line.item.amount);
                match (base, total) {
                    (Some(base), Some(total)) => Ok((line, base, total)),
                    _ => Err(LinePricingError::Overflow),
                }
            });

            match line {
                Ok((line, base, total)) => {
                    base_amount = base;
                    total_amount = total;
                    priced.push(line.item);
                }
                Err(err) => {
                    warn!(service_id = %item.service_id, "Skipping line item: {}", err);
                    warnings.push(LineComputationWarning {
                        service_id: item.service_id,
                        reason: err.to_string().into(),
                    });
                    priced.push(LineItem {
                        quantity: Some(item.effective_quantity()),
                        base_price: Decimal::ZERO,
                        discounted_price: Decimal::ZERO,
                        package_price: None,
                        discount_amount: Decimal::ZERO,
                        amount: Decimal::ZERO,
                        ..item.clone()
                    });
                }
            }
        }
        self.transaction_dao.commit(tx).await?;

        let outcome = PricingOutcome {
            line_items: priced.into(),
            base_amount: round_money(base_amount),
            total_amount: round_money(total_amount),
            warnings: warnings.into(),
        };
        debug!(
            base_amount = %outcome.base_amount,
            total_amount = %outcome.total_amount,
            "Priced booking"
        );
        Ok(outcome)
    }
}
