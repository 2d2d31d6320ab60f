//! Postgres-backed booking store.
//!
//! The unique index on `booking_reference` is the hard uniqueness backstop;
//! a 23505 on insert surfaces as [`StoreError::DuplicateReference`] and the
//! allocator regenerates the reference.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use stayforge_booking::{AddOnSelection, Booking, BookingReference, BookingStatus, GuestDetails};
use stayforge_catalog::ProductKind;
use stayforge_core::{CurrencyCode, ProductId};

use crate::error::{StoreError, is_unique_violation, map_sqlx_error};

use super::r#trait::BookingStore;

#[derive(Debug, Clone)]
pub struct PostgresBookingStore {
    pool: Arc<PgPool>,
}

impl PostgresBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    #[instrument(skip(self, booking), fields(reference = %booking.reference), err)]
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let add_ons = serde_json::to_value(&booking.add_ons)
            .map_err(|e| StoreError::Storage(format!("add-on serialization failed: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO bookings (
                booking_reference,
                product_id,
                kind,
                check_in,
                check_out,
                quantity,
                guest_name,
                guest_email,
                guest_phone,
                total_price,
                currency,
                status,
                created_at,
                add_ons
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(booking.reference.as_str())
        .bind(booking.product_id.as_uuid())
        .bind(kind_to_str(booking.kind))
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.quantity as i32)
        .bind(&booking.guest.name)
        .bind(&booking.guest.email)
        .bind(booking.guest.phone.as_deref())
        .bind(booking.total_price as i64)
        .bind(booking.currency.as_str())
        .bind(status_to_str(booking.status))
        .bind(booking.created_at)
        .bind(&add_ons)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateReference(booking.reference.as_str().to_string())
            } else {
                map_sqlx_error("insert_booking", e)
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self), fields(reference = %reference), err)]
    async fn get(&self, reference: &BookingReference) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                booking_reference,
                product_id,
                kind,
                check_in,
                check_out,
                quantity,
                guest_name,
                guest_email,
                guest_phone,
                total_price,
                currency,
                status,
                created_at,
                add_ons
            FROM bookings
            WHERE booking_reference = $1
            LIMIT 1
            "#,
        )
        .bind(reference.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_booking", e))?;

        row.map(|row| booking_from_row(&row)).transpose()
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                booking_reference,
                product_id,
                kind,
                check_in,
                check_out,
                quantity,
                guest_name,
                guest_email,
                guest_phone,
                total_price,
                currency,
                status,
                created_at,
                add_ons
            FROM bookings
            WHERE product_id = $1
            ORDER BY check_in ASC, booking_reference ASC
            "#,
        )
        .bind(product_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_bookings", e))?;

        rows.iter().map(booking_from_row).collect()
    }
}

fn kind_to_str(kind: ProductKind) -> &'static str {
    match kind {
        ProductKind::Room => "room",
        ProductKind::Event => "event",
    }
}

fn kind_from_str(s: &str) -> Result<ProductKind, StoreError> {
    match s {
        "room" => Ok(ProductKind::Room),
        "event" => Ok(ProductKind::Event),
        other => Err(StoreError::Storage(format!("unknown product kind: {other}"))),
    }
}

fn status_to_str(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "confirmed",
        BookingStatus::Cancelled => "cancelled",
        BookingStatus::Completed => "completed",
    }
}

fn status_from_str(s: &str) -> Result<BookingStatus, StoreError> {
    match s {
        "confirmed" => Ok(BookingStatus::Confirmed),
        "cancelled" => Ok(BookingStatus::Cancelled),
        "completed" => Ok(BookingStatus::Completed),
        other => Err(StoreError::Storage(format!("unknown booking status: {other}"))),
    }
}

// SQLx row types

#[derive(Debug)]
struct BookingRow {
    booking_reference: String,
    product_id: uuid::Uuid,
    kind: String,
    check_in: NaiveDate,
    check_out: Option<NaiveDate>,
    quantity: i32,
    guest_name: String,
    guest_email: String,
    guest_phone: Option<String>,
    total_price: i64,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    add_ons: serde_json::Value,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for BookingRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(BookingRow {
            booking_reference: row.try_get("booking_reference")?,
            product_id: row.try_get("product_id")?,
            kind: row.try_get("kind")?,
            check_in: row.try_get("check_in")?,
            check_out: row.try_get("check_out")?,
            quantity: row.try_get("quantity")?,
            guest_name: row.try_get("guest_name")?,
            guest_email: row.try_get("guest_email")?,
            guest_phone: row.try_get("guest_phone")?,
            total_price: row.try_get("total_price")?,
            currency: row.try_get("currency")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            add_ons: row.try_get("add_ons")?,
        })
    }
}

fn booking_from_row(row: &sqlx::postgres::PgRow) -> Result<Booking, StoreError> {
    let row = BookingRow::from_row(row)
        .map_err(|e| StoreError::Storage(format!("failed to deserialize booking row: {e}")))?;

    let reference = BookingReference::parse(&row.booking_reference)
        .map_err(|e| StoreError::Storage(format!("corrupt booking_reference column: {e}")))?;
    let currency = CurrencyCode::new(row.currency)
        .map_err(|e| StoreError::Storage(format!("corrupt currency column: {e}")))?;
    let add_ons: Vec<AddOnSelection> = serde_json::from_value(row.add_ons)
        .map_err(|e| StoreError::Storage(format!("corrupt add_ons column: {e}")))?;

    Ok(Booking {
        reference,
        product_id: ProductId::from_uuid(row.product_id),
        kind: kind_from_str(&row.kind)?,
        check_in: row.check_in,
        check_out: row.check_out,
        quantity: row.quantity as u32,
        guest: GuestDetails {
            name: row.guest_name,
            email: row.guest_email,
            phone: row.guest_phone,
        },
        total_price: row.total_price as u64,
        currency,
        status: status_from_str(&row.status)?,
        created_at: row.created_at,
        add_ons,
    })
}
