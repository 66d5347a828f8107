use std::sync::Arc;

use crate::{
    date_from_db, date_to_db, decimal_from_db, optional_decimal_from_db, time_from_db, time_to_db,
    uuid_from_db, ResultDbErrorExt,
};
use async_trait::async_trait;
use dao::{
    booking::{
        BookingDao, BookingEntity, BookingKindEntity, BookingStatusEntity, LineItemEntity,
        PaymentStatusEntity, SessionRowEntity,
    },
    DaoError,
};
use sqlx::{query, query_as, SqliteConnection};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use tracing::debug;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, kind, status, resource_id, package_id, date, from_time, to_time, base_amount, total_amount, deposit_percentage, deposit_amount, paid_amount, payment_status, used_hours, remaining_hours, created, deleted, update_version";

#[derive(sqlx::FromRow)]
struct BookingDb {
    id: Vec<u8>,
    kind: String,
    status: String,
    resource_id: Option<Vec<u8>>,
    package_id: Option<Vec<u8>>,
    date: String,
    from_time: Option<String>,
    to_time: Option<String>,
    base_amount: String,
    total_amount: String,
    deposit_percentage: Option<String>,
    deposit_amount: String,
    paid_amount: String,
    payment_status: String,
    used_hours: Option<String>,
    remaining_hours: Option<String>,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}

#[derive(sqlx::FromRow)]
struct LineItemDb {
    service_id: Vec<u8>,
    quantity: Option<String>,
    base_price: String,
    discounted_price: String,
    package_price: Option<String>,
    discount_amount: String,
    amount: String,
}

impl TryFrom<&LineItemDb> for LineItemEntity {
    type Error = DaoError;

    fn try_from(row: &LineItemDb) -> Result<Self, Self::Error> {
        Ok(Self {
            service_id: uuid_from_db(&row.service_id)?,
            quantity: optional_decimal_from_db(row.quantity.as_deref())?,
            base_price: decimal_from_db(&row.base_price)?,
            discounted_price: decimal_from_db(&row.discounted_price)?,
            package_price: optional_decimal_from_db(row.package_price.as_deref())?,
            discount_amount: decimal_from_db(&row.discount_amount)?,
            amount: decimal_from_db(&row.amount)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRowDb {
    date: String,
    from_time: Option<String>,
    to_time: Option<String>,
    hours: Option<String>,
}

impl TryFrom<&SessionRowDb> for SessionRowEntity {
    type Error = DaoError;

    fn try_from(row: &SessionRowDb) -> Result<Self, Self::Error> {
        Ok(Self {
            date: date_from_db(&row.date)?,
            from: time_from_db(row.from_time.as_deref())?,
            to: time_from_db(row.to_time.as_deref())?,
            hours: optional_decimal_from_db(row.hours.as_deref())?,
        })
    }
}

impl BookingDb {
    fn into_entity(
        self,
        session_rows: Arc<[SessionRowEntity]>,
        line_items: Arc<[LineItemEntity]>,
    ) -> Result<BookingEntity, DaoError> {
        Ok(BookingEntity {
            id: uuid_from_db(&self.id)?,
            kind: BookingKindEntity::try_from(self.kind.as_str())?,
            status: BookingStatusEntity::try_from(self.status.as_str())?,
            resource_id: self.resource_id.as_deref().map(uuid_from_db).transpose()?,
            package_id: self.package_id.as_deref().map(uuid_from_db).transpose()?,
            date: date_from_db(&self.date)?,
            from: time_from_db(self.from_time.as_deref())?,
            to: time_from_db(self.to_time.as_deref())?,
            session_rows,
            line_items,
            base_amount: decimal_from_db(&self.base_amount)?,
            total_amount: decimal_from_db(&self.total_amount)?,
            deposit_percentage: optional_decimal_from_db(self.deposit_percentage.as_deref())?,
            deposit_amount: decimal_from_db(&self.deposit_amount)?,
            paid_amount: decimal_from_db(&self.paid_amount)?,
            payment_status: PaymentStatusEntity::try_from(self.payment_status.as_str())?,
            used_hours: optional_decimal_from_db(self.used_hours.as_deref())?,
            remaining_hours: optional_decimal_from_db(self.remaining_hours.as_deref())?,
            created: PrimitiveDateTime::parse(&self.created, &Iso8601::DATE_TIME)?,
            deleted: self
                .deleted
                .as_ref()
                .map(|deleted| PrimitiveDateTime::parse(deleted, &Iso8601::DATE_TIME))
                .transpose()?,
            version: uuid_from_db(&self.update_version)?,
        })
    }
}

/// Loads the session rows and line items of a booking row.
async fn load_booking(
    conn: &mut SqliteConnection,
    booking: BookingDb,
) -> Result<BookingEntity, DaoError> {
    let session_rows = query_as::<_, SessionRowDb>(
        "SELECT date, from_time, to_time, hours FROM booking_session WHERE booking_id = ? ORDER BY position",
    )
    .bind(&booking.id)
    .fetch_all(&mut *conn)
    .await
    .map_db_error()?
    .iter()
    .map(SessionRowEntity::try_from)
    .collect::<Result<Arc<[SessionRowEntity]>, DaoError>>()?;
    let line_items = query_as::<_, LineItemDb>(
        "SELECT service_id, quantity, base_price, discounted_price, package_price, discount_amount, amount FROM booking_line_item WHERE booking_id = ? ORDER BY position",
    )
    .bind(&booking.id)
    .fetch_all(&mut *conn)
    .await
    .map_db_error()?
    .iter()
    .map(LineItemEntity::try_from)
    .collect::<Result<Arc<[LineItemEntity]>, DaoError>>()?;
    booking.into_entity(session_rows, line_items)
}

/// Replaces the session rows and line items of a booking.
async fn store_children(
    conn: &mut SqliteConnection,
    entity: &BookingEntity,
) -> Result<(), DaoError> {
    let id = entity.id.as_bytes().to_vec();
    query("DELETE FROM booking_session WHERE booking_id = ?")
        .bind(&id)
        .execute(&mut *conn)
        .await
        .map_db_error()?;
    query("DELETE FROM booking_line_item WHERE booking_id = ?")
        .bind(&id)
        .execute(&mut *conn)
        .await
        .map_db_error()?;

    for (position, row) in entity.session_rows.iter().enumerate() {
        query(
            r"INSERT INTO booking_session (booking_id, position, date, from_time, to_time, hours) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(position as i64)
        .bind(date_to_db(row.date)?)
        .bind(time_to_db(row.from)?)
        .bind(time_to_db(row.to)?)
        .bind(row.hours.map(|hours| hours.to_string()))
        .execute(&mut *conn)
        .await
        .map_db_error()?;
    }
    for (position, item) in entity.line_items.iter().enumerate() {
        query(
            r"INSERT INTO booking_line_item (booking_id, position, service_id, quantity, base_price, discounted_price, package_price, discount_amount, amount) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(position as i64)
        .bind(item.service_id.as_bytes().to_vec())
        .bind(item.quantity.map(|quantity| quantity.to_string()))
        .bind(item.base_price.to_string())
        .bind(item.discounted_price.to_string())
        .bind(item.package_price.map(|price| price.to_string()))
        .bind(item.discount_amount.to_string())
        .bind(item.amount.to_string())
        .execute(&mut *conn)
        .await
        .map_db_error()?;
    }
    Ok(())
}

pub struct BookingDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl BookingDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl BookingDao for BookingDaoImpl {
    type Transaction = crate::TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BookingEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        let mut conn = tx.tx.lock().await;
        let booking = query_as::<_, BookingDb>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM booking WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(conn.as_mut())
        .await
        .map_db_error()?;
        match booking {
            Some(booking) => Ok(Some(load_booking(conn.as_mut(), booking).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_resource_and_date(
        &self,
        resource_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        let resource_id = resource_id.as_bytes().to_vec();
        let date = date_to_db(date)?;
        let mut conn = tx.tx.lock().await;
        let rows = query_as::<_, BookingDb>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM booking WHERE resource_id = ? AND deleted IS NULL AND (date = ? OR id IN (SELECT booking_id FROM booking_session WHERE date = ?))"
        ))
        .bind(resource_id)
        .bind(&date)
        .bind(&date)
        .fetch_all(conn.as_mut())
        .await
        .map_db_error()?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            bookings.push(load_booking(conn.as_mut(), row).await?);
        }
        debug!(date = %date, found = bookings.len(), "Loaded bookings of resource");
        Ok(bookings.into())
    }

    async fn create(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let created = entity.created.format(&Iso8601::DATE_TIME)?;
        let deleted = entity
            .deleted
            .map(|deleted| deleted.format(&Iso8601::DATE_TIME))
            .transpose()?;
        let mut conn = tx.tx.lock().await;
        query(
            r"INSERT INTO booking (id, kind, status, resource_id, package_id, date, from_time, to_time, base_amount, total_amount, deposit_percentage, deposit_amount, paid_amount, payment_status, used_hours, remaining_hours, created, deleted, update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.kind.as_str())
        .bind(entity.status.as_str())
        .bind(entity.resource_id.map(|id| id.as_bytes().to_vec()))
        .bind(entity.package_id.map(|id| id.as_bytes().to_vec()))
        .bind(date_to_db(entity.date)?)
        .bind(time_to_db(entity.from)?)
        .bind(time_to_db(entity.to)?)
        .bind(entity.base_amount.to_string())
        .bind(entity.total_amount.to_string())
        .bind(entity.deposit_percentage.map(|value| value.to_string()))
        .bind(entity.deposit_amount.to_string())
        .bind(entity.paid_amount.to_string())
        .bind(entity.payment_status.as_str())
        .bind(entity.used_hours.map(|value| value.to_string()))
        .bind(entity.remaining_hours.map(|value| value.to_string()))
        .bind(created)
        .bind(deleted)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .execute(conn.as_mut())
        .await
        .map_db_error()?;
        store_children(conn.as_mut(), entity).await
    }

    async fn update(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let deleted = entity
            .deleted
            .map(|deleted| deleted.format(&Iso8601::DATE_TIME))
            .transpose()?;
        let mut conn = tx.tx.lock().await;
        query(
            r"UPDATE booking SET status = ?, resource_id = ?, package_id = ?, date = ?, from_time = ?, to_time = ?, base_amount = ?, total_amount = ?, deposit_percentage = ?, deposit_amount = ?, paid_amount = ?, payment_status = ?, used_hours = ?, remaining_hours = ?, deleted = ?, update_version = ?, update_process = ?, update_timestamp = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(entity.status.as_str())
        .bind(entity.resource_id.map(|id| id.as_bytes().to_vec()))
        .bind(entity.package_id.map(|id| id.as_bytes().to_vec()))
        .bind(date_to_db(entity.date)?)
        .bind(time_to_db(entity.from)?)
        .bind(time_to_db(entity.to)?)
        .bind(entity.base_amount.to_string())
        .bind(entity.total_amount.to_string())
        .bind(entity.deposit_percentage.map(|value| value.to_string()))
        .bind(entity.deposit_amount.to_string())
        .bind(entity.paid_amount.to_string())
        .bind(entity.payment_status.as_str())
        .bind(entity.used_hours.map(|value| value.to_string()))
        .bind(entity.remaining_hours.map(|value| value.to_string()))
        .bind(deleted)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .bind(entity.id.as_bytes().to_vec())
        .execute(conn.as_mut())
        .await
        .map_db_error()?;
        store_children(conn.as_mut(), entity).await
    }
}
