//! Embedded schema bootstrap.
//!
//! Applied once at startup. The constraints here are part of the engine's
//! contract: exactly one inventory row per (product, date), booked capacity
//! bounded by total capacity, globally unique booking references.

use sqlx::PgPool;

use crate::error::{StoreError, map_sqlx_error};

pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventory_entries (
            product_id      UUID NOT NULL,
            date            DATE NOT NULL,
            total_capacity  INTEGER NOT NULL CHECK (total_capacity >= 0),
            booked_capacity INTEGER NOT NULL DEFAULT 0
                CHECK (booked_capacity >= 0 AND booked_capacity <= total_capacity),
            unit_price      BIGINT NOT NULL CHECK (unit_price >= 0),
            currency        TEXT NOT NULL,
            closed          BOOLEAN NOT NULL DEFAULT FALSE,
            PRIMARY KEY (product_id, date)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("create_inventory_entries", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            booking_reference TEXT PRIMARY KEY,
            product_id        UUID NOT NULL,
            kind              TEXT NOT NULL,
            check_in          DATE NOT NULL,
            check_out         DATE,
            quantity          INTEGER NOT NULL CHECK (quantity >= 1),
            guest_name        TEXT NOT NULL,
            guest_email       TEXT NOT NULL,
            guest_phone       TEXT,
            total_price       BIGINT NOT NULL CHECK (total_price >= 0),
            currency          TEXT NOT NULL,
            status            TEXT NOT NULL,
            created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            add_ons           JSONB NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("create_bookings", e))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_inventory_entries_date ON inventory_entries (date)",
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("create_inventory_date_index", e))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_bookings_product_stay ON bookings (product_id, check_in, check_out)",
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("create_bookings_stay_index", e))?;

    Ok(())
}
