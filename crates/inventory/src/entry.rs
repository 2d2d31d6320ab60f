use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stayforge_core::{CurrencyCode, DomainError, DomainResult, ProductId};

/// One capacity row: a product on a calendar day.
///
/// Exactly one entry exists per (product, date); the storage layer enforces
/// the unique key. `booked_capacity` is only ever mutated through
/// [`reserve`](InventoryEntry::reserve) / [`release`](InventoryEntry::release),
/// which preserve `0 ≤ booked_capacity ≤ total_capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub product_id: ProductId,
    pub date: NaiveDate,
    pub total_capacity: u32,
    pub booked_capacity: u32,
    /// Price per unit per day, in the smallest currency unit (e.g., cents).
    pub unit_price: u64,
    pub currency: CurrencyCode,
    /// Manually taken off sale, independent of remaining capacity.
    pub closed: bool,
}

impl InventoryEntry {
    pub fn new(
        product_id: ProductId,
        date: NaiveDate,
        total_capacity: u32,
        unit_price: u64,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            product_id,
            date,
            total_capacity,
            booked_capacity: 0,
            unit_price,
            currency,
            closed: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.total_capacity - self.booked_capacity
    }

    pub fn is_bookable(&self) -> bool {
        !self.closed && self.remaining() > 0
    }

    pub fn can_reserve(&self, quantity: u32) -> bool {
        !self.closed && self.remaining() >= quantity
    }

    /// Check-and-increment. Callers must hold whatever exclusion the storage
    /// layer provides for this (product, date) key; the entry itself only
    /// guarantees the capacity invariant.
    pub fn reserve(&mut self, quantity: u32) -> DomainResult<()> {
        if self.closed {
            return Err(DomainError::invariant("entry is closed"));
        }
        if self.remaining() < quantity {
            return Err(DomainError::conflict(format!(
                "insufficient capacity: requested {quantity}, remaining {}",
                self.remaining()
            )));
        }
        self.booked_capacity += quantity;
        Ok(())
    }

    /// Decrement `booked_capacity`, floored at 0.
    pub fn release(&mut self, quantity: u32) {
        self.booked_capacity = self.booked_capacity.saturating_sub(quantity);
    }
}

/// One calendar day as reported by the inventory store: either a configured
/// row, or an explicit marker that no row exists for that day.
///
/// Callers must be able to tell "sold out" apart from "not configured";
/// missing days are therefore never silently skipped or defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaySlot {
    Configured(InventoryEntry),
    Missing(NaiveDate),
}

impl DaySlot {
    pub fn date(&self) -> NaiveDate {
        match self {
            DaySlot::Configured(entry) => entry.date,
            DaySlot::Missing(date) => *date,
        }
    }

    pub fn entry(&self) -> Option<&InventoryEntry> {
        match self {
            DaySlot::Configured(entry) => Some(entry),
            DaySlot::Missing(_) => None,
        }
    }
}
