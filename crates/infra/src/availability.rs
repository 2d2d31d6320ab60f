//! Read-side availability queries.

use chrono::NaiveDate;
use tracing::instrument;

use stayforge_core::{DateRange, ProductId};
use stayforge_inventory::{AvailabilityCalendar, aggregate};

use crate::allocator::BookingError;
use crate::inventory_store::InventoryStore;

/// Lock-free availability reads over the inventory store.
///
/// Results are advisory: they may be stale by the time a booking attempt
/// runs, and the allocator re-validates at reservation time regardless.
#[derive(Debug)]
pub struct AvailabilityService<I> {
    inventory: I,
}

impl<I> AvailabilityService<I> {
    pub fn new(inventory: I) -> Self {
        Self { inventory }
    }
}

impl<I> AvailabilityService<I>
where
    I: InventoryStore,
{
    /// Per-day availability for `[from, to)`. Pure read; no side effects.
    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn availability(
        &self,
        product_id: ProductId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AvailabilityCalendar, BookingError> {
        let range = DateRange::new(from, to)?;

        let slots = self
            .inventory
            .get_range(product_id, range)
            .await
            .map_err(|e| BookingError::Storage(e.to_string()))?;

        let calendar = aggregate(product_id, range, &slots);
        if calendar.currency_mismatch {
            tracing::warn!(
                %product_id,
                "inventory entries disagree on currency across the requested range"
            );
        }

        Ok(calendar)
    }
}
