use async_trait::async_trait;
use std::sync::Arc;

use stayforge_booking::{Booking, BookingReference};
use stayforge_core::ProductId;

use crate::error::StoreError;

/// Owner of persisted booking records. The allocator is their sole creator.
///
/// `insert()` must reject a duplicate reference with
/// [`StoreError::DuplicateReference`]; the unique index is the hard
/// backstop behind reference generation.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError>;

    async fn get(&self, reference: &BookingReference) -> Result<Option<Booking>, StoreError>;

    /// All bookings for a product, ascending by check-in. Backs reporting
    /// and the capacity-accounting checks.
    async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Booking>, StoreError>;
}

#[async_trait]
impl<S> BookingStore for Arc<S>
where
    S: BookingStore + ?Sized,
{
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        (**self).insert(booking).await
    }

    async fn get(&self, reference: &BookingReference) -> Result<Option<Booking>, StoreError> {
        (**self).get(reference).await
    }

    async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Booking>, StoreError> {
        (**self).list_for_product(product_id).await
    }
}
