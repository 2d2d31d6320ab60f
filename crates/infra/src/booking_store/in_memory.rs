use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stayforge_booking::{Booking, BookingReference};
use stayforge_core::ProductId;

use crate::error::StoreError;

use super::r#trait::BookingStore;

/// In-memory booking store for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<HashMap<BookingReference, Booking>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut map = self
            .bookings
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        if map.contains_key(&booking.reference) {
            return Err(StoreError::DuplicateReference(
                booking.reference.as_str().to_string(),
            ));
        }
        map.insert(booking.reference.clone(), booking.clone());

        Ok(())
    }

    async fn get(&self, reference: &BookingReference) -> Result<Option<Booking>, StoreError> {
        let map = self
            .bookings
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(map.get(reference).cloned())
    }

    async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Booking>, StoreError> {
        let map = self
            .bookings
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        let mut bookings: Vec<Booking> = map
            .values()
            .filter(|booking| booking.product_id == product_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|booking| (booking.check_in, booking.reference.as_str().to_string()));

        Ok(bookings)
    }
}
