use std::sync::Arc;

use dao::booking::{
    BookingEntity, BookingKindEntity, BookingStatusEntity, LineItemEntity, MockBookingDao,
    PaymentStatusEntity,
};
use dao::catalog::{MockCatalogDao, PricingUnitEntity, ServiceCatalogEntity};
use dao::package::{MockPackageDao, PackageDefinitionEntity, PackageItemEntity};
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::{always, eq};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use service::availability::MockAvailabilityService;
use service::booking::{
    Booking, BookingKind, BookingService, BookingStatus, LineItem, PaymentStatus, SessionRow,
};
use service::clock::MockClockService;
use service::config::{BookingConfig, MockConfigService};
use service::discount::{Discount, MockDiscountService};
use service::pricing::{MockPricingService, PricingOutcome};
use service::resource_lock::MockResourceLockService;
use service::uuid_service::MockUuidService;
use service::{ServiceError, ValidationFailureItem};
use time::macros::{date, datetime, time};
use time::Time;
use uuid::{uuid, Uuid};

use crate::booking::{BookingServiceDeps, BookingServiceImpl};
use crate::capacity::CapacityServiceImpl;
use crate::deposit::DepositServiceImpl;
use crate::line_item::LineItemNormalizerImpl;
use crate::test::error_test::{
    test_booking_conflict, test_capacity_exceeded, test_conflicts, test_deposit_shortfall,
    test_not_found, test_time_order_wrong, test_validation_error, test_zero_id_error,
    test_zero_version_error,
};

pub fn default_id() -> Uuid {
    uuid!("CEA260A0-112B-4970-936C-F7E529955BD0")
}
pub fn alternate_id() -> Uuid {
    uuid!("CEA260A0-112B-4970-936C-F7E529955BD1")
}
pub fn default_version() -> Uuid {
    uuid!("F79C462A-8D4E-42E1-8171-DB4DBD019E50")
}
pub fn alternate_version() -> Uuid {
    uuid!("F79C462A-8D4E-42E1-8171-DB4DBD019E51")
}
pub fn resource_id() -> Uuid {
    uuid!("04215DFE-13C4-413C-8C66-77AC741BB5F0")
}
pub fn package_id() -> Uuid {
    uuid!("7A7FF57A-782B-4C2E-A68B-4E2D81D79380")
}
pub fn duration_service() -> Uuid {
    uuid!("2B8D6F10-3C5E-4A7B-9D1F-0E2A4C6B8D01")
}
pub fn quantity_service() -> Uuid {
    uuid!("2B8D6F10-3C5E-4A7B-9D1F-0E2A4C6B8D02")
}

pub fn default_service_booking() -> Booking {
    Booking {
        id: Uuid::nil(),
        kind: BookingKind::Service,
        status: BookingStatus::Pending,
        resource_id: Some(resource_id()),
        package_id: None,
        date: date!(2024 - 05 - 10),
        from: Some(time!(10:00)),
        to: Some(time!(12:00)),
        session_rows: Arc::new([]),
        line_items: Arc::new([
            LineItem::for_service(duration_service(), None),
            LineItem::for_service(quantity_service(), None),
        ]),
        base_amount: Decimal::ZERO,
        total_amount: Decimal::ZERO,
        deposit_percentage: None,
        deposit_amount: Decimal::ZERO,
        paid_amount: Decimal::ZERO,
        payment_status: PaymentStatus::Unpaid,
        used_hours: None,
        remaining_hours: None,
        created: None,
        deleted: None,
        version: Uuid::nil(),
    }
}

pub fn default_package_booking() -> Booking {
    Booking {
        kind: BookingKind::Package,
        package_id: Some(package_id()),
        from: None,
        to: None,
        session_rows: Arc::new([
            SessionRow {
                date: date!(2024 - 06 - 01),
                from: Some(time!(09:00)),
                to: Some(time!(13:00)),
                hours: None,
            },
            SessionRow {
                date: date!(2024 - 06 - 02),
                from: Some(time!(14:00)),
                to: Some(time!(18:00)),
                hours: None,
            },
        ]),
        line_items: Arc::new([]),
        ..default_service_booking()
    }
}

pub fn default_booking_entity() -> BookingEntity {
    BookingEntity {
        id: default_id(),
        kind: BookingKindEntity::Service,
        status: BookingStatusEntity::Pending,
        resource_id: Some(resource_id()),
        package_id: None,
        date: date!(2024 - 05 - 10),
        from: Some(time!(10:00)),
        to: Some(time!(12:00)),
        session_rows: Arc::new([]),
        line_items: Arc::new([LineItemEntity {
            service_id: duration_service(),
            quantity: Some(dec!(2)),
            base_price: dec!(100),
            discounted_price: dec!(100),
            package_price: None,
            discount_amount: dec!(0),
            amount: dec!(200),
        }]),
        base_amount: dec!(200),
        total_amount: dec!(200),
        deposit_percentage: Some(dec!(50)),
        deposit_amount: dec!(100),
        paid_amount: dec!(0),
        payment_status: PaymentStatusEntity::Unpaid,
        used_hours: None,
        remaining_hours: None,
        created: datetime!(2024-05-01 09:00:00),
        deleted: None,
        version: default_version(),
    }
}

pub fn default_package_entity() -> PackageDefinitionEntity {
    PackageDefinitionEntity {
        id: package_id(),
        name: "Wedding".into(),
        total_hours: dec!(10),
        items: Arc::new([PackageItemEntity {
            service_id: duration_service(),
            quantity: dec!(1),
            base_price: dec!(1000),
            package_price: dec!(1000),
        }]),
    }
}

/// Prices every line at 100 per unit.
fn flat_price(line_items: &[LineItem]) -> PricingOutcome {
    let line_items: Arc<[LineItem]> = line_items
        .iter()
        .map(|item| {
            let quantity = item.effective_quantity();
            LineItem {
                quantity: Some(quantity),
                base_price: dec!(100),
                discounted_price: dec!(100),
                discount_amount: dec!(0),
                amount: quantity * dec!(100),
                ..item.clone()
            }
        })
        .collect();
    let total: Decimal = line_items.iter().map(|item| item.amount).sum();
    PricingOutcome {
        line_items,
        base_amount: total,
        total_amount: total,
        warnings: Arc::new([]),
    }
}

struct BookingDependencies {
    booking_dao: MockBookingDao,
    package_dao: MockPackageDao,
    catalog_dao: MockCatalogDao,
    availability_service: MockAvailabilityService,
    discount_service: MockDiscountService,
    pricing_service: MockPricingService,
    config_service: MockConfigService,
    resource_lock_service: MockResourceLockService,
    clock_service: MockClockService,
    uuid_service: MockUuidService,
    transaction_dao: MockTransactionDao,
}
impl BookingServiceDeps for BookingDependencies {
    type Transaction = MockTransaction;
    type BookingDao = MockBookingDao;
    type PackageDao = MockPackageDao;
    type CatalogDao = MockCatalogDao;
    type AvailabilityService = MockAvailabilityService;
    type LineItemNormalizer = LineItemNormalizerImpl;
    type DiscountService = MockDiscountService;
    type PricingService = MockPricingService;
    type CapacityService = CapacityServiceImpl;
    type DepositService = DepositServiceImpl;
    type ConfigService = MockConfigService;
    type ResourceLockService = MockResourceLockService;
    type ClockService = MockClockService;
    type UuidService = MockUuidService;
    type TransactionDao = MockTransactionDao;
}
impl BookingDependencies {
    fn build_service(self) -> BookingServiceImpl<BookingDependencies> {
        BookingServiceImpl {
            booking_dao: self.booking_dao.into(),
            package_dao: self.package_dao.into(),
            catalog_dao: self.catalog_dao.into(),
            availability_service: self.availability_service.into(),
            line_item_normalizer: LineItemNormalizerImpl.into(),
            discount_service: self.discount_service.into(),
            pricing_service: self.pricing_service.into(),
            capacity_service: CapacityServiceImpl.into(),
            deposit_service: DepositServiceImpl.into(),
            config_service: self.config_service.into(),
            resource_lock_service: self.resource_lock_service.into(),
            clock_service: self.clock_service.into(),
            uuid_service: self.uuid_service.into(),
            transaction_dao: self.transaction_dao.into(),
        }
    }

    fn expect_available(&mut self) {
        self.availability_service
            .expect_check_booking()
            .returning(|_, _| Ok(()));
    }

    fn expect_create_ids(&mut self) {
        self.uuid_service
            .expect_new_uuid()
            .with(eq("BookingService::create id"))
            .returning(|_| default_id());
        self.uuid_service
            .expect_new_uuid()
            .with(eq("BookingService::create version"))
            .returning(|_| default_version());
    }
}

fn build_dependencies() -> BookingDependencies {
    let mut catalog_dao = MockCatalogDao::new();
    catalog_dao.expect_find_by_id().returning(|id, _| {
        let unit = if id == duration_service() {
            PricingUnitEntity::Duration
        } else {
            PricingUnitEntity::Quantity
        };
        Ok(Some(ServiceCatalogEntity {
            id,
            name: "Studio service".into(),
            base_price: dec!(100),
            unit,
        }))
    });

    let mut discount_service = MockDiscountService::new();
    discount_service
        .expect_resolve()
        .returning(|_, _| Ok(Discount::none()));

    let mut pricing_service = MockPricingService::new();
    pricing_service
        .expect_price()
        .returning(|_, line_items, _, _, _| Ok(flat_price(line_items)));

    let mut config_service = MockConfigService::new();
    config_service
        .expect_get_config()
        .returning(|_| Ok(BookingConfig::default()));

    let mut resource_lock_service = MockResourceLockService::new();
    resource_lock_service.expect_lock().returning(|_| ());

    let mut clock_service = MockClockService::new();
    clock_service
        .expect_date_time_now()
        .returning(|| datetime!(2063-04-05 23:42:00));

    let mut transaction_dao = MockTransactionDao::new();
    transaction_dao
        .expect_use_transaction()
        .returning(|_| Ok(MockTransaction));
    transaction_dao.expect_commit().returning(|_| Ok(()));

    BookingDependencies {
        booking_dao: MockBookingDao::new(),
        package_dao: MockPackageDao::new(),
        catalog_dao,
        availability_service: MockAvailabilityService::new(),
        discount_service,
        pricing_service,
        config_service,
        resource_lock_service,
        clock_service,
        uuid_service: MockUuidService::new(),
        transaction_dao,
    }
}

#[tokio::test]
async fn test_get() {
    let mut deps = build_dependencies();
    deps.booking_dao
        .expect_find_by_id()
        .with(eq(default_id()), always())
        .returning(|_, _| Ok(Some(default_booking_entity())));
    let service = deps.build_service();
    let result = service.get(default_id(), None).await.unwrap();
    assert_eq!(result, Booking::from(&default_booking_entity()));
}

#[tokio::test]
async fn test_get_not_found() {
    let mut deps = build_dependencies();
    deps.booking_dao
        .expect_find_by_id()
        .with(eq(default_id()), always())
        .returning(|_, _| Ok(None));
    let service = deps.build_service();
    let result = service.get(default_id(), None).await;
    test_not_found(&result, &default_id());
}

#[tokio::test]
async fn test_get_deleted() {
    let mut deps = build_dependencies();
    deps.booking_dao
        .expect_find_by_id()
        .with(eq(default_id()), always())
        .returning(|_, _| {
            Ok(Some(BookingEntity {
                deleted: Some(datetime!(2024-05-02 10:00:00)),
                ..default_booking_entity()
            }))
        });
    let service = deps.build_service();
    let result = service.get(default_id(), None).await;
    test_not_found(&result, &default_id());
}

#[tokio::test]
async fn test_create_service_booking() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.expect_create_ids();
    deps.booking_dao
        .expect_create()
        .withf(|entity, process, _| {
            entity.id == default_id()
                && entity.version == default_version()
                && entity.created == datetime!(2063-04-05 23:42:00)
                && process == "booking-service"
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();

    let result = service
        .create(&default_service_booking(), None)
        .await
        .unwrap();

    assert_eq!(result.id, default_id());
    assert_eq!(result.version, default_version());
    assert_eq!(result.created, Some(datetime!(2063-04-05 23:42:00)));
    // Two booked hours for the duration service, one unit for the other.
    assert_eq!(result.line_items[0].quantity, Some(dec!(2)));
    assert_eq!(result.line_items[1].quantity, Some(dec!(1)));
    assert_eq!(result.total_amount, dec!(300));
    assert_eq!(result.deposit_percentage, Some(dec!(30)));
    assert_eq!(result.deposit_amount, dec!(90));
    assert_eq!(result.payment_status, PaymentStatus::Unpaid);
    assert_eq!(result.used_hours, None);
}

#[tokio::test]
async fn test_create_merges_line_items() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.expect_create_ids();
    deps.booking_dao
        .expect_create()
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();

    let result = service
        .create(
            &Booking {
                line_items: Arc::new([
                    LineItem::for_service(quantity_service(), Some(dec!(1))),
                    LineItem::for_service(quantity_service(), Some(dec!(2))),
                ]),
                ..default_service_booking()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(result.line_items.len(), 1);
    assert_eq!(result.line_items[0].quantity, Some(dec!(3)));
    assert_eq!(result.total_amount, dec!(300));
}

#[tokio::test]
async fn test_create_with_id() {
    let deps = build_dependencies();
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                id: default_id(),
                ..default_service_booking()
            },
            None,
        )
        .await;
    test_zero_id_error(&result);
}

#[tokio::test]
async fn test_create_with_version() {
    let deps = build_dependencies();
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                version: default_version(),
                ..default_service_booking()
            },
            None,
        )
        .await;
    test_zero_version_error(&result);
}

#[tokio::test]
async fn test_create_with_created() {
    let deps = build_dependencies();
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                created: Some(datetime!(2024-05-01 09:00:00)),
                ..default_service_booking()
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(ServiceError::CreatedSetOnCreate)));
}

#[tokio::test]
async fn test_create_conflicting_booking() {
    let mut deps = build_dependencies();
    deps.expect_create_ids();
    deps.availability_service
        .expect_check_booking()
        .returning(|_, _| {
            Err(ServiceError::BookingConflict {
                resource_id: resource_id(),
                booking_id: alternate_id(),
                date: date!(2024 - 05 - 10),
                from: time!(10:00),
                to: time!(12:00),
            })
        });
    deps.booking_dao.expect_create().never();
    let service = deps.build_service();
    let result = service.create(&default_service_booking(), None).await;
    test_booking_conflict(&result, &alternate_id());
}

#[tokio::test]
async fn test_create_missing_end_time() {
    let mut deps = build_dependencies();
    deps.expect_create_ids();
    deps.booking_dao.expect_create().never();
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                to: None,
                ..default_service_booking()
            },
            None,
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("to".into()),
        1,
    );
}

#[tokio::test]
async fn test_create_empty_time_range() {
    let mut deps = build_dependencies();
    deps.expect_create_ids();
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                to: Some(time!(10:00)),
                ..default_service_booking()
            },
            None,
        )
        .await;
    test_time_order_wrong(&result);
}

#[tokio::test]
async fn test_create_negative_payment() {
    let mut deps = build_dependencies();
    deps.expect_create_ids();
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                paid_amount: dec!(-1),
                ..default_service_booking()
            },
            None,
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("paid_amount".into()),
        1,
    );
}

#[tokio::test]
async fn test_create_with_deposit_shortfall() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.expect_create_ids();
    deps.booking_dao.expect_create().never();
    let service = deps.build_service();
    // 300 total, 90 deposit
    let result = service
        .create(
            &Booking {
                paid_amount: dec!(50),
                ..default_service_booking()
            },
            None,
        )
        .await;
    test_deposit_shortfall(&result, dec!(40));
}

#[tokio::test]
async fn test_create_partially_paid() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.expect_create_ids();
    deps.booking_dao
        .expect_create()
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                paid_amount: dec!(90),
                ..default_service_booking()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(result.payment_status, PaymentStatus::PartiallyPaid);
}

#[tokio::test]
async fn test_create_ignores_submitted_payment_status() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.expect_create_ids();
    deps.booking_dao
        .expect_create()
        .withf(|entity, _, _| entity.payment_status == PaymentStatusEntity::Unpaid)
        .times(1)
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                payment_status: PaymentStatus::Paid,
                ..default_service_booking()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(result.paid_amount, dec!(0));
    assert_eq!(result.payment_status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn test_create_sub_second_time() {
    let mut deps = build_dependencies();
    deps.expect_create_ids();
    deps.booking_dao.expect_create().never();
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                from: Some(Time::from_hms_milli(10, 0, 0, 500).unwrap()),
                ..default_service_booking()
            },
            None,
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("from".into()),
        1,
    );
}

#[tokio::test]
async fn test_create_package_booking_sub_second_session() {
    let mut deps = build_dependencies();
    deps.expect_create_ids();
    deps.booking_dao.expect_create().never();
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                session_rows: Arc::new([SessionRow {
                    date: date!(2024 - 06 - 01),
                    from: Some(time!(09:00)),
                    to: Some(Time::from_hms_nano(13, 0, 0, 1).unwrap()),
                    hours: None,
                }]),
                ..default_package_booking()
            },
            None,
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("session_rows".into()),
        1,
    );
}

#[tokio::test]
async fn test_create_package_booking() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.expect_create_ids();
    deps.package_dao
        .expect_find_by_id()
        .with(eq(package_id()), always())
        .returning(|_, _| Ok(Some(default_package_entity())));
    deps.pricing_service
        .expect_populate_from_package()
        .times(1)
        .returning(|package, _| {
            Ok(package
                .items
                .iter()
                .map(|item| LineItem {
                    package_price: Some(item.package_price),
                    ..LineItem::for_service(item.service_id, Some(item.quantity))
                })
                .collect())
        });
    deps.booking_dao
        .expect_create()
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();

    let result = service
        .create(&default_package_booking(), None)
        .await
        .unwrap();
    assert_eq!(result.session_rows[0].hours, Some(dec!(4)));
    assert_eq!(result.session_rows[1].hours, Some(dec!(4)));
    assert_eq!(result.used_hours, Some(dec!(8)));
    assert_eq!(result.remaining_hours, Some(dec!(2)));
    assert_eq!(result.line_items.len(), 1);
    assert_eq!(result.line_items[0].package_price, Some(dec!(1000)));
    assert_eq!(result.total_amount, dec!(100));
    assert_eq!(result.deposit_amount, dec!(30));
}

#[tokio::test]
async fn test_create_package_booking_exceeding_hours() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.expect_create_ids();
    deps.package_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(default_package_entity())));
    deps.booking_dao.expect_create().never();
    let service = deps.build_service();

    let result = service
        .create(
            &Booking {
                session_rows: Arc::new([
                    SessionRow {
                        date: date!(2024 - 06 - 01),
                        from: Some(time!(08:00)),
                        to: Some(time!(14:00)),
                        hours: None,
                    },
                    SessionRow {
                        date: date!(2024 - 06 - 02),
                        from: Some(time!(08:00)),
                        to: Some(time!(13:00)),
                        hours: None,
                    },
                ]),
                ..default_package_booking()
            },
            None,
        )
        .await;
    test_capacity_exceeded(&result, dec!(10));
}

#[tokio::test]
async fn test_create_package_booking_unknown_package() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.expect_create_ids();
    deps.package_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(None));
    let service = deps.build_service();
    let result = service.create(&default_package_booking(), None).await;
    test_validation_error(
        &result,
        &ValidationFailureItem::IdDoesNotExist("package_id".into(), package_id()),
        1,
    );
}

#[tokio::test]
async fn test_create_package_booking_without_package() {
    let mut deps = build_dependencies();
    deps.expect_create_ids();
    let service = deps.build_service();
    let result = service
        .create(
            &Booking {
                package_id: None,
                ..default_package_booking()
            },
            None,
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("package_id".into()),
        1,
    );
}

#[tokio::test]
async fn test_validate_does_not_persist() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.booking_dao.expect_create().never();
    deps.booking_dao.expect_update().never();
    let service = deps.build_service();
    let result = service
        .validate(&default_service_booking(), None)
        .await
        .unwrap();
    assert_eq!(result.total_amount, dec!(300));
    assert_eq!(result.id, Uuid::nil());
}

#[tokio::test]
async fn test_update_keeps_deposit_percentage() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.booking_dao
        .expect_find_by_id()
        .with(eq(default_id()), always())
        .returning(|_, _| Ok(Some(default_booking_entity())));
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("BookingService::update version"))
        .returning(|_| alternate_version());
    deps.booking_dao
        .expect_update()
        .withf(|entity, process, _| {
            entity.version == alternate_version()
                && entity.created == datetime!(2024-05-01 09:00:00)
                && process == "booking-service"
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();

    let result = service
        .update(
            &Booking {
                id: default_id(),
                version: default_version(),
                deposit_percentage: Some(dec!(10)),
                ..default_service_booking()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(result.version, alternate_version());
    assert_eq!(result.deposit_percentage, Some(dec!(50)));
    assert_eq!(result.deposit_amount, dec!(150));
}

#[tokio::test]
async fn test_update_keeps_stored_payment_status() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.booking_dao
        .expect_find_by_id()
        .with(eq(default_id()), always())
        .returning(|_, _| {
            Ok(Some(BookingEntity {
                payment_status: PaymentStatusEntity::PartiallyPaid,
                ..default_booking_entity()
            }))
        });
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("BookingService::update version"))
        .returning(|_| alternate_version());
    deps.booking_dao
        .expect_update()
        .withf(|entity, _, _| entity.payment_status == PaymentStatusEntity::PartiallyPaid)
        .times(1)
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();

    let result = service
        .update(
            &Booking {
                id: default_id(),
                version: default_version(),
                payment_status: PaymentStatus::Paid,
                ..default_service_booking()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(result.payment_status, PaymentStatus::PartiallyPaid);
}

#[tokio::test]
async fn test_update_version_conflict() {
    let mut deps = build_dependencies();
    deps.booking_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(default_booking_entity())));
    deps.booking_dao.expect_update().never();
    let service = deps.build_service();
    let result = service
        .update(
            &Booking {
                id: default_id(),
                version: alternate_version(),
                ..default_service_booking()
            },
            None,
        )
        .await;
    test_conflicts(
        &result,
        &default_id(),
        &default_version(),
        &alternate_version(),
    );
}

#[tokio::test]
async fn test_update_not_found() {
    let mut deps = build_dependencies();
    deps.booking_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(None));
    let service = deps.build_service();
    let result = service
        .update(
            &Booking {
                id: default_id(),
                version: default_version(),
                ..default_service_booking()
            },
            None,
        )
        .await;
    test_not_found(&result, &default_id());
}

#[tokio::test]
async fn test_update_kind_change() {
    let mut deps = build_dependencies();
    deps.booking_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(default_booking_entity())));
    let service = deps.build_service();
    let result = service
        .update(
            &Booking {
                id: default_id(),
                version: default_version(),
                ..default_package_booking()
            },
            None,
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::ModificationNotAllowed("kind".into()),
        1,
    );
}

#[tokio::test]
async fn test_cancel() {
    let mut deps = build_dependencies();
    deps.booking_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(default_booking_entity())));
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("BookingService::cancel version"))
        .returning(|_| alternate_version());
    deps.booking_dao
        .expect_update()
        .withf(|entity, _, _| {
            entity.status == BookingStatusEntity::Cancelled && entity.version == alternate_version()
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();
    let result = service.cancel(default_id(), None).await.unwrap();
    assert!(result.is_cancelled());
    assert_eq!(result.total_amount, dec!(200));
}

#[tokio::test]
async fn test_cancel_not_found() {
    let mut deps = build_dependencies();
    deps.booking_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(None));
    let service = deps.build_service();
    let result = service.cancel(alternate_id(), None).await;
    test_not_found(&result, &alternate_id());
}

#[tokio::test]
async fn test_session_rows_are_recomputed() {
    let mut deps = build_dependencies();
    deps.expect_available();
    deps.package_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(default_package_entity())));
    let service = deps.build_service();
    let result = service
        .validate(
            &Booking {
                session_rows: Arc::new([SessionRow {
                    date: date!(2024 - 06 - 01),
                    from: Some(time!(09:00)),
                    to: Some(time!(10:30)),
                    hours: Some(dec!(99)),
                }]),
                line_items: Arc::new([LineItem::for_service(duration_service(), Some(dec!(1)))]),
                ..default_package_booking()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(result.session_rows[0].hours, Some(dec!(1.5)));
    assert_eq!(result.remaining_hours, Some(dec!(8.5)));
}

#[test]
fn test_entity_conversion_requires_created() {
    let booking = Booking {
        created: None,
        ..Booking::from(&default_booking_entity())
    };
    assert!(BookingEntity::try_from(&booking).is_err());
}
