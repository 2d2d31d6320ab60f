use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use stayforge_core::{DateRange, ProductId};
use stayforge_inventory::{DaySlot, InventoryEntry};

use crate::error::StoreError;

use super::r#trait::InventoryStore;

/// In-memory inventory store.
///
/// Intended for tests/dev. The write lock is held across the whole
/// check-then-increment of a reservation set, so a reservation is
/// all-or-nothing and indivisible without any compensation logic.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    entries: RwLock<HashMap<(ProductId, NaiveDate), InventoryEntry>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct row read for assertions in tests.
    pub fn entry(&self, product_id: ProductId, date: NaiveDate) -> Option<InventoryEntry> {
        let map = self.entries.read().ok()?;
        map.get(&(product_id, date)).cloned()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn get_range(
        &self,
        product_id: ProductId,
        range: DateRange,
    ) -> Result<Vec<DaySlot>, StoreError> {
        let map = self
            .entries
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        Ok(range
            .days()
            .map(|date| match map.get(&(product_id, date)) {
                Some(entry) => DaySlot::Configured(entry.clone()),
                None => DaySlot::Missing(date),
            })
            .collect())
    }

    async fn reserve(
        &self,
        product_id: ProductId,
        days: &[NaiveDate],
        quantity: u32,
    ) -> Result<Vec<InventoryEntry>, StoreError> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        // First pass: classify every day before touching any row.
        for date in days {
            match map.get(&(product_id, *date)) {
                None => return Err(StoreError::NotConfigured(*date)),
                Some(entry) if entry.closed => return Err(StoreError::Closed(*date)),
                Some(entry) if entry.remaining() < quantity => {
                    return Err(StoreError::InsufficientCapacity(*date));
                }
                Some(_) => {}
            }
        }

        // Second pass: apply. Still under the same write lock, so the checks
        // above cannot be invalidated in between.
        let mut reserved = Vec::with_capacity(days.len());
        for date in days {
            let entry = map
                .get_mut(&(product_id, *date))
                .ok_or(StoreError::NotConfigured(*date))?;
            entry
                .reserve(quantity)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            reserved.push(entry.clone());
        }
        reserved.sort_by_key(|entry| entry.date);

        Ok(reserved)
    }

    async fn release(
        &self,
        product_id: ProductId,
        days: &[NaiveDate],
        quantity: u32,
    ) -> Result<(), StoreError> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        for date in days {
            if let Some(entry) = map.get_mut(&(product_id, *date)) {
                entry.release(quantity);
            }
        }

        Ok(())
    }

    async fn upsert_entry(&self, entry: InventoryEntry) -> Result<(), StoreError> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        map.insert((entry.product_id, entry.date), entry);
        Ok(())
    }
}
