//! Integration tests for the booking pipeline.
//!
//! Tests: BookingRequest → BookingAllocator → InventoryStore + BookingStore
//!
//! Verifies:
//! - Concurrent bookings never oversell a day
//! - Multi-day reservation is all-or-nothing (no partial holds survive)
//! - Booked capacity always equals the sum of confirmed bookings
//! - Persistence failures compensate the reservation before surfacing

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use stayforge_booking::{AddOnRequest, Booking, BookingReference, BookingRequest};
    use stayforge_catalog::{AddOn, AddOnKind, ProductKind, ProductSummary, StaticCatalog};
    use stayforge_core::{CurrencyCode, DateRange, HotelId, ProductId};
    use stayforge_inventory::{DaySlot, InventoryEntry};

    use crate::allocator::{BookingAllocator, BookingError};
    use crate::availability::AvailabilityService;
    use crate::booking_store::{BookingStore, InMemoryBookingStore};
    use crate::error::StoreError;
    use crate::inventory_store::{InMemoryInventoryStore, InventoryStore};

    type TestAllocator<B> =
        BookingAllocator<Arc<InMemoryInventoryStore>, B, Arc<StaticCatalog>>;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn eur() -> CurrencyCode {
        CurrencyCode::new("EUR").unwrap()
    }

    fn setup() -> (
        Arc<InMemoryInventoryStore>,
        Arc<InMemoryBookingStore>,
        Arc<StaticCatalog>,
        TestAllocator<Arc<InMemoryBookingStore>>,
    ) {
        let inventory = Arc::new(InMemoryInventoryStore::new());
        let bookings = Arc::new(InMemoryBookingStore::new());
        let catalog = Arc::new(StaticCatalog::new());
        let allocator =
            BookingAllocator::new(inventory.clone(), bookings.clone(), catalog.clone());
        (inventory, bookings, catalog, allocator)
    }

    async fn seed(
        inventory: &InMemoryInventoryStore,
        product_id: ProductId,
        date: &str,
        total: u32,
        unit_price: u64,
    ) {
        inventory
            .upsert_entry(InventoryEntry::new(
                product_id,
                d(date),
                total,
                unit_price,
                eur(),
            ))
            .await
            .unwrap();
    }

    fn room_request(product_id: ProductId, check_in: &str, check_out: &str) -> BookingRequest {
        BookingRequest {
            product_id,
            kind: ProductKind::Room,
            check_in: d(check_in),
            check_out: Some(d(check_out)),
            quantity: 1,
            guest_count: 1,
            guest_name: "Ada Lovelace".to_string(),
            guest_email: "ada@example.com".to_string(),
            guest_phone: None,
            add_ons: vec![],
        }
    }

    fn booked(inventory: &InMemoryInventoryStore, product_id: ProductId, date: &str) -> u32 {
        inventory
            .entry(product_id, d(date))
            .map(|entry| entry.booked_capacity)
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn booking_confirms_and_decrements_every_day() {
        let (inventory, bookings, _, allocator) = setup();
        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 5, 10_000).await;
        seed(&inventory, pid, "2026-07-11", 5, 12_000).await;

        let mut request = room_request(pid, "2026-07-10", "2026-07-12");
        request.quantity = 2;

        let booking = allocator.create_booking(request).await.unwrap();
        assert_eq!(booking.total_price, (10_000 + 12_000) * 2);
        assert_eq!(booking.currency, eur());
        assert_eq!(booked(&inventory, pid, "2026-07-10"), 2);
        assert_eq!(booked(&inventory, pid, "2026-07-11"), 2);

        let loaded = bookings.get(&booking.reference).await.unwrap().unwrap();
        assert_eq!(loaded, booking);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bookings_never_oversell_a_single_unit() {
        let (inventory, _, _, allocator) = setup();
        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 1, 10_000).await;

        let allocator = Arc::new(allocator);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let allocator = allocator.clone();
            let request = room_request(pid, "2026-07-10", "2026-07-11");
            handles.push(tokio::spawn(
                async move { allocator.create_booking(request).await },
            ));
        }

        let mut confirmed = 0;
        let mut unavailable = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => confirmed += 1,
                Err(BookingError::CapacityUnavailable(_)) => unavailable += 1,
                Err(other) => panic!("unexpected failure: {other}"),
            }
        }

        assert_eq!(confirmed, 1);
        assert_eq!(unavailable, 7);
        assert_eq!(booked(&inventory, pid, "2026-07-10"), 1);
    }

    #[tokio::test]
    async fn short_middle_day_rejects_the_whole_range() {
        let (inventory, bookings, _, allocator) = setup();
        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 3, 10_000).await;
        seed(&inventory, pid, "2026-07-11", 0, 10_000).await;
        seed(&inventory, pid, "2026-07-12", 3, 10_000).await;

        let err = allocator
            .create_booking(room_request(pid, "2026-07-10", "2026-07-13"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::CapacityUnavailable(date) if date == d("2026-07-11")));

        // No partial holds survive the failed attempt.
        assert_eq!(booked(&inventory, pid, "2026-07-10"), 0);
        assert_eq!(booked(&inventory, pid, "2026-07-12"), 0);
        assert!(bookings.list_for_product(pid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_day_is_not_configured_not_capacity() {
        let (inventory, _, _, allocator) = setup();
        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 3, 10_000).await;

        let err = allocator
            .create_booking(room_request(pid, "2026-07-10", "2026-07-12"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotConfigured(date) if date == d("2026-07-11")));
        assert_eq!(booked(&inventory, pid, "2026-07-10"), 0);
    }

    #[tokio::test]
    async fn booked_capacity_equals_sum_of_confirmed_bookings() {
        let (inventory, bookings, _, allocator) = setup();
        let pid = ProductId::new();
        for date in ["2026-07-10", "2026-07-11", "2026-07-12"] {
            seed(&inventory, pid, date, 10, 10_000).await;
        }

        let mut first = room_request(pid, "2026-07-10", "2026-07-12");
        first.quantity = 3;
        allocator.create_booking(first).await.unwrap();

        let mut second = room_request(pid, "2026-07-11", "2026-07-13");
        second.quantity = 2;
        allocator.create_booking(second).await.unwrap();

        // An attempt that fails must not disturb the accounting.
        let mut oversized = room_request(pid, "2026-07-10", "2026-07-13");
        oversized.quantity = 9;
        allocator.create_booking(oversized).await.unwrap_err();

        let confirmed = bookings.list_for_product(pid).await.unwrap();
        for date in ["2026-07-10", "2026-07-11", "2026-07-12"] {
            let expected: u32 = confirmed
                .iter()
                .filter(|booking| booking.holds_capacity_on(d(date)))
                .map(|booking| booking.quantity)
                .sum();
            assert_eq!(booked(&inventory, pid, date), expected, "mismatch on {date}");
        }
    }

    #[tokio::test]
    async fn add_ons_are_priced_through_the_catalog() {
        let (inventory, _, catalog, allocator) = setup();
        let pid = ProductId::new();
        let hotel_id = HotelId::new();
        seed(&inventory, pid, "2026-07-10", 5, 100).await;
        seed(&inventory, pid, "2026-07-11", 5, 120).await;

        catalog.insert_product(ProductSummary {
            id: pid,
            hotel_id: Some(hotel_id),
            name: "Seaview Double".to_string(),
            kind: ProductKind::Room,
            base_price_hint: None,
            currency: None,
        });
        let breakfast = AddOn {
            id: stayforge_core::AddOnId::new(),
            name: "Breakfast".to_string(),
            unit_price: 10,
            kind: AddOnKind::PerNight,
        };
        catalog.insert_add_on(hotel_id, breakfast.clone());

        let mut request = room_request(pid, "2026-07-10", "2026-07-12");
        request.add_ons = vec![AddOnRequest {
            add_on_id: breakfast.id,
            quantity: 1,
        }];

        let booking = allocator.create_booking(request).await.unwrap();
        // 100 + 120 base, plus a per-night add-on at 10 over 2 nights.
        assert_eq!(booking.total_price, 240);
        assert_eq!(booking.add_ons.len(), 1);
        assert_eq!(booking.add_ons[0].name, "Breakfast");
    }

    #[tokio::test]
    async fn unknown_add_on_is_rejected_before_any_reservation() {
        let (inventory, _, catalog, allocator) = setup();
        let pid = ProductId::new();
        let hotel_id = HotelId::new();
        seed(&inventory, pid, "2026-07-10", 5, 10_000).await;
        catalog.insert_product(ProductSummary {
            id: pid,
            hotel_id: Some(hotel_id),
            name: "Seaview Double".to_string(),
            kind: ProductKind::Room,
            base_price_hint: None,
            currency: None,
        });

        let mut request = room_request(pid, "2026-07-10", "2026-07-11");
        request.add_ons = vec![AddOnRequest {
            add_on_id: stayforge_core::AddOnId::new(),
            quantity: 1,
        }];

        let err = allocator.create_booking(request).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidRequest(_)));
        assert_eq!(booked(&inventory, pid, "2026-07-10"), 0);
    }

    #[tokio::test]
    async fn same_day_stay_reserves_one_day_and_one_night() {
        let (inventory, _, _, allocator) = setup();
        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 2, 9_000).await;

        let mut request = room_request(pid, "2026-07-10", "2026-07-10");
        request.check_out = Some(d("2026-07-10"));

        let booking = allocator.create_booking(request).await.unwrap();
        assert_eq!(booking.total_price, 9_000);
        assert_eq!(booked(&inventory, pid, "2026-07-10"), 1);
        assert_eq!(booked(&inventory, pid, "2026-07-11"), 0);
    }

    #[tokio::test]
    async fn event_is_priced_once_per_unit() {
        let (inventory, _, _, allocator) = setup();
        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 100, 5_000).await;

        let mut request = room_request(pid, "2026-07-10", "2026-07-10");
        request.kind = ProductKind::Event;
        request.check_out = None;
        request.quantity = 3;

        let booking = allocator.create_booking(request).await.unwrap();
        assert_eq!(booking.total_price, 15_000);
        assert_eq!(booked(&inventory, pid, "2026-07-10"), 3);
    }

    #[tokio::test]
    async fn availability_read_is_idempotent_and_advisory() {
        let (inventory, _, _, allocator) = setup();
        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 2, 10_000).await;
        seed(&inventory, pid, "2026-07-12", 2, 10_000).await;

        let service = AvailabilityService::new(inventory.clone());
        let first = service
            .availability(pid, d("2026-07-10"), d("2026-07-13"))
            .await
            .unwrap();
        let second = service
            .availability(pid, d("2026-07-10"), d("2026-07-13"))
            .await
            .unwrap();
        assert_eq!(first, second);

        // Day 2 was never configured; day 1 is merely bookable.
        assert!(first.days[0].available);
        assert!(!first.days[1].available);

        // A booking in between is re-validated at reservation time, and the
        // next read observes it.
        allocator
            .create_booking(room_request(pid, "2026-07-10", "2026-07-11"))
            .await
            .unwrap();
        let third = service
            .availability(pid, d("2026-07-10"), d("2026-07-13"))
            .await
            .unwrap();
        assert_eq!(third.days[0].units_available, 1);
    }

    // -------------------------
    // Failure-injection doubles
    // -------------------------

    /// Booking store whose insert always fails terminally.
    struct FailingBookingStore;

    #[async_trait]
    impl BookingStore for FailingBookingStore {
        async fn insert(&self, _booking: &Booking) -> Result<(), StoreError> {
            Err(StoreError::Storage("disk on fire".to_string()))
        }

        async fn get(&self, _reference: &BookingReference) -> Result<Option<Booking>, StoreError> {
            Ok(None)
        }

        async fn list_for_product(&self, _product_id: ProductId) -> Result<Vec<Booking>, StoreError> {
            Ok(vec![])
        }
    }

    /// Booking store that reports every reference as already taken.
    struct CollidingBookingStore;

    #[async_trait]
    impl BookingStore for CollidingBookingStore {
        async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
            Err(StoreError::DuplicateReference(
                booking.reference.as_str().to_string(),
            ))
        }

        async fn get(&self, _reference: &BookingReference) -> Result<Option<Booking>, StoreError> {
            Ok(None)
        }

        async fn list_for_product(&self, _product_id: ProductId) -> Result<Vec<Booking>, StoreError> {
            Ok(vec![])
        }
    }

    /// Inventory store that loses the first N reservation races, then
    /// delegates.
    struct RacyInventoryStore {
        inner: Arc<InMemoryInventoryStore>,
        losses_left: AtomicU32,
    }

    #[async_trait]
    impl InventoryStore for RacyInventoryStore {
        async fn get_range(
            &self,
            product_id: ProductId,
            range: DateRange,
        ) -> Result<Vec<DaySlot>, StoreError> {
            self.inner.get_range(product_id, range).await
        }

        async fn reserve(
            &self,
            product_id: ProductId,
            days: &[NaiveDate],
            quantity: u32,
        ) -> Result<Vec<InventoryEntry>, StoreError> {
            if self
                .losses_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                    left.checked_sub(1)
                })
                .is_ok()
            {
                return Err(StoreError::RaceLost("simulated contention".to_string()));
            }
            self.inner.reserve(product_id, days, quantity).await
        }

        async fn release(
            &self,
            product_id: ProductId,
            days: &[NaiveDate],
            quantity: u32,
        ) -> Result<(), StoreError> {
            self.inner.release(product_id, days, quantity).await
        }

        async fn upsert_entry(&self, entry: InventoryEntry) -> Result<(), StoreError> {
            self.inner.upsert_entry(entry).await
        }
    }

    #[tokio::test]
    async fn persistence_failure_releases_every_hold() {
        let inventory = Arc::new(InMemoryInventoryStore::new());
        let catalog = Arc::new(StaticCatalog::new());
        let allocator =
            BookingAllocator::new(inventory.clone(), Arc::new(FailingBookingStore), catalog);

        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 5, 10_000).await;
        seed(&inventory, pid, "2026-07-11", 5, 10_000).await;

        let err = allocator
            .create_booking(room_request(pid, "2026-07-10", "2026-07-12"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::PersistenceFailed(_)));
        assert_eq!(booked(&inventory, pid, "2026-07-10"), 0);
        assert_eq!(booked(&inventory, pid, "2026-07-11"), 0);
    }

    #[tokio::test]
    async fn reference_exhaustion_releases_every_hold() {
        let inventory = Arc::new(InMemoryInventoryStore::new());
        let catalog = Arc::new(StaticCatalog::new());
        let allocator =
            BookingAllocator::new(inventory.clone(), Arc::new(CollidingBookingStore), catalog);

        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 5, 10_000).await;

        let err = allocator
            .create_booking(room_request(pid, "2026-07-10", "2026-07-11"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::PersistenceFailed(_)));
        assert_eq!(booked(&inventory, pid, "2026-07-10"), 0);
    }

    #[tokio::test]
    async fn transient_race_is_retried_then_succeeds() {
        let inner = Arc::new(InMemoryInventoryStore::new());
        let pid = ProductId::new();
        seed(&inner, pid, "2026-07-10", 5, 10_000).await;

        let racy = Arc::new(RacyInventoryStore {
            inner: inner.clone(),
            losses_left: AtomicU32::new(2),
        });
        let allocator = BookingAllocator::new(
            racy,
            Arc::new(InMemoryBookingStore::new()),
            Arc::new(StaticCatalog::new()),
        );

        allocator
            .create_booking(room_request(pid, "2026-07-10", "2026-07-11"))
            .await
            .unwrap();
        assert_eq!(booked(&inner, pid, "2026-07-10"), 1);
    }

    #[tokio::test]
    async fn persistent_race_surfaces_as_capacity_unavailable() {
        let inner = Arc::new(InMemoryInventoryStore::new());
        let pid = ProductId::new();
        seed(&inner, pid, "2026-07-10", 5, 10_000).await;

        let racy = Arc::new(RacyInventoryStore {
            inner: inner.clone(),
            losses_left: AtomicU32::new(u32::MAX),
        });
        let allocator = BookingAllocator::new(
            racy,
            Arc::new(InMemoryBookingStore::new()),
            Arc::new(StaticCatalog::new()),
        );

        let err = allocator
            .create_booking(room_request(pid, "2026-07-10", "2026-07-11"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::CapacityUnavailable(date) if date == d("2026-07-10")));
        assert_eq!(booked(&inner, pid, "2026-07-10"), 0);
    }

    #[tokio::test]
    async fn invalid_range_never_touches_storage() {
        let (inventory, _, _, allocator) = setup();
        let pid = ProductId::new();
        seed(&inventory, pid, "2026-07-10", 5, 10_000).await;

        let mut request = room_request(pid, "2026-07-10", "2026-07-09");
        request.check_out = Some(d("2026-07-09"));
        let err = allocator.create_booking(request).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidRequest(_)));

        let mut request = room_request(pid, "2026-07-10", "2026-07-11");
        request.quantity = 0;
        let err = allocator.create_booking(request).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidRequest(_)));
    }
}
