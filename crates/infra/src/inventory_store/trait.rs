use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use stayforge_core::{DateRange, ProductId};
use stayforge_inventory::{DaySlot, InventoryEntry};

use crate::error::StoreError;

/// Source of truth for capacity and price.
///
/// The store owns `InventoryEntry` rows exclusively (unique per
/// (product, date)); `booked_capacity` is only written through
/// `reserve`/`release`.
///
/// ## Reservation Semantics
///
/// `reserve()` is the central concurrency-safety contract of the whole
/// system: for every day in the set, check-and-increment must be indivisible
/// with respect to concurrent callers for the same (product, date) keys, and
/// the day set is reserved all-or-nothing. A failure on any day leaves
/// every day untouched. Implementations scope the whole set to one
/// transaction (row locks) or one lock region; they never compensate
/// partially-applied increments.
///
/// ## Read Semantics
///
/// `get_range()` returns one slot per calendar day in `[from, to)`, in
/// ascending date order. Days without a row are reported as explicit
/// [`DaySlot::Missing`] markers, never silently skipped or defaulted;
/// callers must be able to tell "sold out" apart from "not configured".
/// Reads are lock-free and may be stale by the time a booking attempt runs;
/// reservation re-validates regardless.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// One slot per day of `range`, ascending.
    async fn get_range(
        &self,
        product_id: ProductId,
        range: DateRange,
    ) -> Result<Vec<DaySlot>, StoreError>;

    /// Atomically reserve `quantity` units on every day in `days`.
    ///
    /// Returns the post-reservation entries in ascending date order. The
    /// per-day prices a booking is charged are fixed here, not at
    /// availability time.
    async fn reserve(
        &self,
        product_id: ProductId,
        days: &[NaiveDate],
        quantity: u32,
    ) -> Result<Vec<InventoryEntry>, StoreError>;

    /// Atomically decrement `booked_capacity` on every day, floored at 0.
    ///
    /// Compensation path (booking persistence failed after a successful
    /// reserve) and the hook any cancellation flow would use.
    async fn release(
        &self,
        product_id: ProductId,
        days: &[NaiveDate],
        quantity: u32,
    ) -> Result<(), StoreError>;

    /// Seeding/management write. Exactly one row per (product, date) is
    /// enforced by the unique key; an existing row is replaced.
    async fn upsert_entry(&self, entry: InventoryEntry) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn get_range(
        &self,
        product_id: ProductId,
        range: DateRange,
    ) -> Result<Vec<DaySlot>, StoreError> {
        (**self).get_range(product_id, range).await
    }

    async fn reserve(
        &self,
        product_id: ProductId,
        days: &[NaiveDate],
        quantity: u32,
    ) -> Result<Vec<InventoryEntry>, StoreError> {
        (**self).reserve(product_id, days, quantity).await
    }

    async fn release(
        &self,
        product_id: ProductId,
        days: &[NaiveDate],
        quantity: u32,
    ) -> Result<(), StoreError> {
        (**self).release(product_id, days, quantity).await
    }

    async fn upsert_entry(&self, entry: InventoryEntry) -> Result<(), StoreError> {
        (**self).upsert_entry(entry).await
    }
}
