use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    booking::{BookingDao, BookingEntity},
    catalog::{CatalogDao, PricingUnitEntity},
    package::PackageDao,
    TransactionDao,
};
use rust_decimal::Decimal;
use service::{
    availability::AvailabilityService,
    booking::{Booking, BookingKind, BookingService, BookingStatus, LineItem, PaymentStatus},
    capacity::CapacityService,
    clock::ClockService,
    config::{BookingConfig, ConfigService},
    deposit::DepositService,
    discount::DiscountService,
    line_item::LineItemNormalizer,
    package::{PackageDefinition, PackageItem},
    pricing::PricingService,
    resource_lock::ResourceLockService,
    uuid_service::UuidService,
    ServiceError, ValidationFailureItem,
};
use time::Time;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::gen_service_impl;

const BOOKING_SERVICE_PROCESS: &str = "booking-service";

gen_service_impl! {
    struct BookingServiceImpl: BookingService = BookingServiceDeps {
        BookingDao: BookingDao<Transaction = Self::Transaction> = booking_dao,
        PackageDao: PackageDao<Transaction = Self::Transaction> = package_dao,
        CatalogDao: CatalogDao<Transaction = Self::Transaction> = catalog_dao,
        AvailabilityService: AvailabilityService<Transaction = Self::Transaction> = availability_service,
        LineItemNormalizer: LineItemNormalizer = line_item_normalizer,
        DiscountService: DiscountService<Transaction = Self::Transaction> = discount_service,
        PricingService: PricingService<Transaction = Self::Transaction> = pricing_service,
        CapacityService: CapacityService = capacity_service,
        DepositService: DepositService = deposit_service,
        ConfigService: ConfigService<Transaction = Self::Transaction> = config_service,
        ResourceLockService: ResourceLockService = resource_lock_service,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

/// Times are stored with whole seconds.
fn has_subsecond(time: Option<Time>) -> bool {
    time.is_some_and(|time| time.nanosecond() != 0)
}

/// Checks the fields the pipeline relies on before anything is looked up.
fn validate_fields(booking: &Booking) -> Result<(), ServiceError> {
    let mut validation = Vec::with_capacity(4);
    match booking.kind {
        BookingKind::Service => {
            if booking.from.is_none() || has_subsecond(booking.from) {
                validation.push(ValidationFailureItem::InvalidValue("from".into()));
            }
            if booking.to.is_none() || has_subsecond(booking.to) {
                validation.push(ValidationFailureItem::InvalidValue("to".into()));
            }
        }
        BookingKind::Package => {
            if booking.package_id.is_none() {
                validation.push(ValidationFailureItem::InvalidValue("package_id".into()));
            }
            if booking
                .session_rows
                .iter()
                .any(|row| has_subsecond(row.from) || has_subsecond(row.to))
            {
                validation.push(ValidationFailureItem::InvalidValue("session_rows".into()));
            }
        }
    }
    if booking.paid_amount < Decimal::ZERO {
        validation.push(ValidationFailureItem::InvalidValue("paid_amount".into()));
    }
    if !validation.is_empty() {
        return Err(ServiceError::ValidationError(validation.into()));
    }

    if booking.kind == BookingKind::Service {
        booking.time_range().transpose()?;
    } else {
        for row in booking.session_rows.iter() {
            row.time_range().transpose()?;
        }
    }
    Ok(())
}

/// Invariants every validated booking satisfies. A violation is a bug in
/// one of the stages.
fn check_invariants(
    booking: &Booking,
    package: Option<&PackageDefinition>,
    config: &BookingConfig,
) -> Result<(), ServiceError> {
    let basis = booking.basis_amount();
    let mut violations: Vec<&str> = Vec::new();
    if booking.deposit_amount > basis {
        violations.push("deposit exceeds total");
    }
    if config.minimum_booking_amount > Decimal::ZERO
        && basis > Decimal::ZERO
        && booking.deposit_amount < config.minimum_booking_amount.min(basis)
    {
        violations.push("deposit below minimum");
    }
    if package
        .zip(booking.used_hours)
        .is_some_and(|(package, used_hours)| used_hours > package.total_hours)
    {
        violations.push("used hours exceed package");
    }
    let mut services = HashSet::with_capacity(booking.line_items.len());
    if !booking
        .line_items
        .iter()
        .all(|item| services.insert(item.service_id))
    {
        violations.push("duplicate service line");
    }

    if violations.is_empty() {
        Ok(())
    } else {
        error!(booking_id = %booking.id, ?violations, "Booking invariants violated");
        Err(ServiceError::InternalError)
    }
}

impl<Deps: BookingServiceDeps> BookingServiceImpl<Deps> {
    async fn lock_resource(
        &self,
        resource_id: Option<Uuid>,
    ) -> Option<<Deps::ResourceLockService as ResourceLockService>::Guard> {
        match resource_id {
            Some(resource_id) => Some(self.resource_lock_service.lock(resource_id).await),
            None => None,
        }
    }

    async fn load_package(
        &self,
        package_id: Option<Uuid>,
        tx: Deps::Transaction,
    ) -> Result<PackageDefinition, ServiceError> {
        let package_id = package_id.ok_or_else(|| {
            ServiceError::ValidationError(Arc::new([ValidationFailureItem::InvalidValue(
                "package_id".into(),
            )]))
        })?;
        self.package_dao
            .find_by_id(package_id, tx)
            .await?
            .as_ref()
            .map(PackageDefinition::from)
            .ok_or_else(|| {
                ServiceError::ValidationError(Arc::new([ValidationFailureItem::IdDoesNotExist(
                    "package_id".into(),
                    package_id,
                )]))
            })
    }

    /// Duration based services of a service booking without an explicit
    /// quantity are charged for the booked hours.
    async fn derive_quantities(
        &self,
        booking: &Booking,
        tx: Deps::Transaction,
    ) -> Result<Arc<[LineItem]>, ServiceError> {
        if booking.kind != BookingKind::Service {
            return Ok(booking.line_items.clone());
        }
        let Some(range) = booking.time_range().transpose()? else {
            return Ok(booking.line_items.clone());
        };
        let hours = range.hours();
        let mut line_items = Vec::with_capacity(booking.line_items.len());
        for item in booking.line_items.iter() {
            if item.quantity.is_some() {
                line_items.push(item.clone());
                continue;
            }
            let quantity = match self.catalog_dao.find_by_id(item.service_id, tx.clone()).await {
                Ok(Some(entry)) if entry.unit == PricingUnitEntity::Duration => Some(hours),
                Ok(_) => None,
                Err(err) => {
                    warn!(service_id = %item.service_id, "Cannot derive quantity: {}", err);
                    None
                }
            };
            line_items.push(LineItem {
                quantity,
                ..item.clone()
            });
        }
        Ok(line_items.into())
    }

    /// Runs every stage in order and returns the booking with all derived
    /// fields replaced. `stored_status` is kept while nothing is paid.
    async fn run_pipeline(
        &self,
        booking: &Booking,
        stored_status: PaymentStatus,
        tx: Deps::Transaction,
    ) -> Result<Booking, ServiceError> {
        validate_fields(booking)?;
        self.availability_service
            .check_booking(booking, Some(tx.clone()))
            .await?;

        let line_items = self.derive_quantities(booking, tx.clone()).await?;
        let line_items = self
            .line_item_normalizer
            .normalize(booking.kind, &line_items);

        let (package, usage) = match booking.kind {
            BookingKind::Package => {
                let package = self.load_package(booking.package_id, tx.clone()).await?;
                let usage = self
                    .capacity_service
                    .compute_usage(&booking.session_rows, package.total_hours)?;
                (Some(package), Some(usage))
            }
            BookingKind::Service => (None, None),
        };

        let discount = self
            .discount_service
            .resolve(booking.resource_id, Some(tx.clone()))
            .await?;
        let line_items = match &package {
            Some(package) if line_items.is_empty() => {
                self.pricing_service
                    .populate_from_package(package, Some(tx.clone()))
                    .await?
            }
            _ => line_items,
        };
        let package_items: &[PackageItem] = match &package {
            Some(package) => &package.items,
            None => &[],
        };
        let pricing = self
            .pricing_service
            .price(
                booking.kind,
                &line_items,
                &discount,
                package_items,
                Some(tx.clone()),
            )
            .await?;
        if !pricing.warnings.is_empty() {
            warn!(
                booking_id = %booking.id,
                skipped = pricing.warnings.len(),
                "Booking totals exclude line items which could not be priced"
            );
        }

        let config = self.config_service.get_config(Some(tx.clone())).await?;
        let deposit_percentage = booking
            .deposit_percentage
            .unwrap_or(config.default_deposit_percentage);
        let basis = pricing.total_amount;
        let deposit_amount = self
            .deposit_service
            .compute_deposit(basis, deposit_percentage, &config);
        self.deposit_service
            .check_payment(booking.paid_amount, deposit_amount, basis)?;
        let payment_status = self
            .deposit_service
            .payment_status(booking.paid_amount, basis, stored_status);

        let (session_rows, used_hours, remaining_hours) = match usage {
            Some(usage) => (
                usage.session_rows,
                Some(usage.used_hours),
                Some(usage.remaining_hours),
            ),
            None => (booking.session_rows.clone(), None, None),
        };
        let validated = Booking {
            session_rows,
            line_items: pricing.line_items,
            base_amount: pricing.base_amount,
            total_amount: pricing.total_amount,
            deposit_percentage: Some(deposit_percentage),
            deposit_amount,
            payment_status,
            used_hours,
            remaining_hours,
            ..booking.clone()
        };
        check_invariants(&validated, package.as_ref(), &config)?;
        Ok(validated)
    }

    async fn find_existing(
        &self,
        id: Uuid,
        tx: Deps::Transaction,
    ) -> Result<BookingEntity, ServiceError> {
        self.booking_dao
            .find_by_id(id, tx)
            .await?
            .filter(|entity| entity.deleted.is_none())
            .ok_or(ServiceError::EntityNotFound(id))
    }
}

#[async_trait]
impl<Deps: BookingServiceDeps> BookingService for BookingServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid, tx: Option<Self::Transaction>) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let booking = Booking::from(&self.find_existing(id, tx.clone()).await?);
        self.transaction_dao.commit(tx).await?;
        Ok(booking)
    }

    #[instrument(skip(self))]
    async fn validate(
        &self,
        booking: &Booking,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let validated = self
            .run_pipeline(booking, PaymentStatus::Unpaid, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(validated)
    }

    #[instrument(skip(self))]
    async fn create(
        &self,
        booking: &Booking,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        if booking.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if booking.version != Uuid::nil() {
            return Err(ServiceError::VersionSetOnCreate);
        }
        if booking.created.is_some() {
            return Err(ServiceError::CreatedSetOnCreate);
        }

        let _guard = self.lock_resource(booking.resource_id).await;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let booking = Booking {
            id: self.uuid_service.new_uuid("BookingService::create id"),
            version: self.uuid_service.new_uuid("BookingService::create version"),
            created: Some(self.clock_service.date_time_now()),
            ..booking.clone()
        };
        let validated = self
            .run_pipeline(&booking, PaymentStatus::Unpaid, tx.clone())
            .await?;

        self.availability_service
            .check_booking(&validated, Some(tx.clone()))
            .await?;
        self.booking_dao
            .create(&(&validated).try_into()?, BOOKING_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        info!(
            booking_id = %validated.id,
            total_amount = %validated.total_amount,
            deposit_amount = %validated.deposit_amount,
            "Booking created"
        );
        Ok(validated)
    }

    #[instrument(skip(self))]
    async fn update(
        &self,
        booking: &Booking,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let _guard = self.lock_resource(booking.resource_id).await;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let persisted = self.find_existing(booking.id, tx.clone()).await?;
        if persisted.version != booking.version {
            return Err(ServiceError::EntityConflicts(
                booking.id,
                persisted.version,
                booking.version,
            ));
        }
        if BookingKind::from(persisted.kind) != booking.kind {
            return Err(ServiceError::ValidationError(Arc::new([
                ValidationFailureItem::ModificationNotAllowed("kind".into()),
            ])));
        }

        let booking = Booking {
            created: Some(persisted.created),
            deposit_percentage: persisted.deposit_percentage.or(booking.deposit_percentage),
            version: self.uuid_service.new_uuid("BookingService::update version"),
            ..booking.clone()
        };
        let validated = self
            .run_pipeline(&booking, persisted.payment_status.into(), tx.clone())
            .await?;

        self.availability_service
            .check_booking(&validated, Some(tx.clone()))
            .await?;
        self.booking_dao
            .update(&(&validated).try_into()?, BOOKING_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        info!(
            booking_id = %validated.id,
            total_amount = %validated.total_amount,
            payment_status = ?validated.payment_status,
            "Booking updated"
        );
        Ok(validated)
    }

    #[instrument(skip(self))]
    async fn cancel(
        &self,
        id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let booking = Booking {
            status: BookingStatus::Cancelled,
            version: self.uuid_service.new_uuid("BookingService::cancel version"),
            ..Booking::from(&self.find_existing(id, tx.clone()).await?)
        };
        self.booking_dao
            .update(&(&booking).try_into()?, BOOKING_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        info!(booking_id = %id, "Booking cancelled");
        Ok(booking)
    }
}
