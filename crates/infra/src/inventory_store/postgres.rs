//! Postgres-backed inventory store.
//!
//! Reservation is the critical section of the whole engine: the day set is
//! locked with `SELECT … FOR UPDATE` and mutated with a single conditional
//! `UPDATE` inside one transaction, so the check-and-increment is indivisible
//! per (product, date) and the set commits all-or-nothing.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `40001` / `40P01` | `RaceLost` | Serialization failure / deadlock between concurrent reservations |
//! | `23505` | `Storage` | Unique violation (cannot occur on this table's write paths) |
//! | other | `Storage` | Connectivity, constraint, pool errors |
//!
//! Capacity conditions (`NotConfigured`, `Closed`, `InsufficientCapacity`)
//! are classified from the locked rows, not from SQL errors.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use stayforge_core::{CurrencyCode, DateRange, ProductId};
use stayforge_inventory::{DaySlot, InventoryEntry};

use crate::error::{StoreError, map_sqlx_error};

use super::r#trait::InventoryStore;

/// Postgres-backed source of truth for capacity and price.
///
/// `Send + Sync`; all operations go through the SQLx connection pool.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn get_range(
        &self,
        product_id: ProductId,
        range: DateRange,
    ) -> Result<Vec<DaySlot>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                product_id,
                date,
                total_capacity,
                booked_capacity,
                unit_price,
                currency,
                closed
            FROM inventory_entries
            WHERE product_id = $1 AND date >= $2 AND date < $3
            ORDER BY date ASC
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(range.from())
        .bind(range.to())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_range", e))?;

        let mut by_date = HashMap::with_capacity(rows.len());
        for row in rows {
            let entry = entry_from_row(&row)?;
            by_date.insert(entry.date, entry);
        }

        Ok(range
            .days()
            .map(|date| match by_date.remove(&date) {
                Some(entry) => DaySlot::Configured(entry),
                None => DaySlot::Missing(date),
            })
            .collect())
    }

    /// Reserve the whole day set in one transaction.
    ///
    /// 1. Lock the matching rows (`FOR UPDATE`)
    /// 2. Classify each requested day (missing / closed / insufficient)
    /// 3. Apply one conditional `UPDATE` across the set
    /// 4. Commit
    ///
    /// Between steps 1 and 4 no concurrent reservation can observe or modify
    /// the locked rows, so two bookings can never both pass the capacity
    /// check for the same day.
    #[instrument(
        skip(self, days),
        fields(product_id = %product_id, day_count = days.len(), quantity),
        err
    )]
    async fn reserve(
        &self,
        product_id: ProductId,
        days: &[NaiveDate],
        quantity: u32,
    ) -> Result<Vec<InventoryEntry>, StoreError> {
        if days.is_empty() {
            return Ok(vec![]);
        }

        let day_set: Vec<NaiveDate> = days.to_vec();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let rows = sqlx::query(
            r#"
            SELECT date, total_capacity, booked_capacity, closed
            FROM inventory_entries
            WHERE product_id = $1 AND date = ANY($2)
            ORDER BY date ASC
            FOR UPDATE
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(&day_set)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_reservation_set", e))?;

        let mut locked = HashMap::with_capacity(rows.len());
        for row in rows {
            let date: NaiveDate = row
                .try_get("date")
                .map_err(|e| StoreError::Storage(format!("failed to read date: {e}")))?;
            let total: i32 = row
                .try_get("total_capacity")
                .map_err(|e| StoreError::Storage(format!("failed to read total_capacity: {e}")))?;
            let booked: i32 = row
                .try_get("booked_capacity")
                .map_err(|e| StoreError::Storage(format!("failed to read booked_capacity: {e}")))?;
            let closed: bool = row
                .try_get("closed")
                .map_err(|e| StoreError::Storage(format!("failed to read closed: {e}")))?;
            locked.insert(date, (total, booked, closed));
        }

        // Classify every requested day before touching any row.
        for date in &day_set {
            let failure = match locked.get(date) {
                None => Some(StoreError::NotConfigured(*date)),
                Some((_, _, true)) => Some(StoreError::Closed(*date)),
                Some((total, booked, false)) if booked + quantity as i32 > *total => {
                    Some(StoreError::InsufficientCapacity(*date))
                }
                Some(_) => None,
            };
            if let Some(err) = failure {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(err);
            }
        }

        let updated = sqlx::query(
            r#"
            UPDATE inventory_entries
            SET booked_capacity = booked_capacity + $3
            WHERE product_id = $1
                AND date = ANY($2)
                AND closed = FALSE
                AND booked_capacity + $3 <= total_capacity
            RETURNING
                product_id,
                date,
                total_capacity,
                booked_capacity,
                unit_price,
                currency,
                closed
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(&day_set)
        .bind(quantity as i32)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("apply_reservation", e))?;

        // The rows are locked, so the conditional update must cover the full
        // set; anything less means the snapshot changed underfoot.
        if updated.len() != day_set.len() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::RaceLost(format!(
                "reservation set changed underfoot: {} of {} days updated",
                updated.len(),
                day_set.len()
            )));
        }

        let mut reserved = Vec::with_capacity(updated.len());
        for row in updated {
            reserved.push(entry_from_row(&row)?);
        }
        reserved.sort_by_key(|entry| entry.date);

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(reserved)
    }

    #[instrument(
        skip(self, days),
        fields(product_id = %product_id, day_count = days.len(), quantity),
        err
    )]
    async fn release(
        &self,
        product_id: ProductId,
        days: &[NaiveDate],
        quantity: u32,
    ) -> Result<(), StoreError> {
        if days.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE inventory_entries
            SET booked_capacity = GREATEST(booked_capacity - $3, 0)
            WHERE product_id = $1 AND date = ANY($2)
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(days.to_vec())
        .bind(quantity as i32)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("release", e))?;

        Ok(())
    }

    #[instrument(skip(self, entry), fields(product_id = %entry.product_id, date = %entry.date), err)]
    async fn upsert_entry(&self, entry: InventoryEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO inventory_entries (
                product_id,
                date,
                total_capacity,
                booked_capacity,
                unit_price,
                currency,
                closed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (product_id, date)
            DO UPDATE SET
                total_capacity = EXCLUDED.total_capacity,
                booked_capacity = EXCLUDED.booked_capacity,
                unit_price = EXCLUDED.unit_price,
                currency = EXCLUDED.currency,
                closed = EXCLUDED.closed
            "#,
        )
        .bind(entry.product_id.as_uuid())
        .bind(entry.date)
        .bind(entry.total_capacity as i32)
        .bind(entry.booked_capacity as i32)
        .bind(entry.unit_price as i64)
        .bind(entry.currency.as_str())
        .bind(entry.closed)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_entry", e))?;

        Ok(())
    }
}

// SQLx row types

#[derive(Debug)]
struct InventoryEntryRow {
    product_id: uuid::Uuid,
    date: NaiveDate,
    total_capacity: i32,
    booked_capacity: i32,
    unit_price: i64,
    currency: String,
    closed: bool,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for InventoryEntryRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(InventoryEntryRow {
            product_id: row.try_get("product_id")?,
            date: row.try_get("date")?,
            total_capacity: row.try_get("total_capacity")?,
            booked_capacity: row.try_get("booked_capacity")?,
            unit_price: row.try_get("unit_price")?,
            currency: row.try_get("currency")?,
            closed: row.try_get("closed")?,
        })
    }
}

fn entry_from_row(row: &sqlx::postgres::PgRow) -> Result<InventoryEntry, StoreError> {
    let row = InventoryEntryRow::from_row(row)
        .map_err(|e| StoreError::Storage(format!("failed to deserialize inventory row: {e}")))?;

    let currency = CurrencyCode::new(row.currency)
        .map_err(|e| StoreError::Storage(format!("corrupt currency column: {e}")))?;

    Ok(InventoryEntry {
        product_id: ProductId::from_uuid(row.product_id),
        date: row.date,
        total_capacity: row.total_capacity as u32,
        booked_capacity: row.booked_capacity as u32,
        unit_price: row.unit_price as u64,
        currency,
        closed: row.closed,
    })
}
