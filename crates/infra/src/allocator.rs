//! Booking allocation pipeline (application-level orchestration).
//!
//! A booking attempt moves through
//! `Received → Validated → Reserved → Persisted → Confirmed`, with failure
//! exits before `Persisted`:
//!
//! ```text
//! BookingRequest
//!   ↓
//! 1. Validate request, derive the stay range          (InvalidRequest)
//! 2. Resolve requested add-ons through the catalog    (InvalidRequest / Catalog)
//! 3. Reserve every day, all-or-nothing, bounded retry (NotConfigured / CapacityUnavailable)
//! 4. Price the stay from the reserved entries
//! 5. Persist with a fresh unique reference            (PersistenceFailed → release)
//!   ↓
//! Confirmed Booking
//! ```
//!
//! Availability a client saw earlier is advisory; step 3 re-validates
//! against live inventory and is the only authority. If step 5 fails after a
//! successful reservation, the holds are compensated with `release` before
//! the error surfaces: no partial holds survive a failed attempt.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::instrument;

use stayforge_booking::{
    AddOnSelection, Booking, BookingReference, BookingRequest, BookingStatus, GuestDetails,
    pricing::{self, DayPrice},
};
use stayforge_catalog::CatalogGateway;
use stayforge_core::{DomainError, ProductId};
use stayforge_inventory::InventoryEntry;

use crate::booking_store::BookingStore;
use crate::error::StoreError;
use crate::inventory_store::InventoryStore;

/// Transient-contention retries before a reservation surfaces as
/// capacity-unavailable.
const MAX_RESERVE_ATTEMPTS: u32 = 3;

/// Reference regenerations before persistence gives up.
const MAX_REFERENCE_ATTEMPTS: u32 = 5;

/// Booking attempt failure, as surfaced to the transport layer.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Malformed request; rejected before touching storage.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A day in the range has no inventory row. Distinct from capacity
    /// exhaustion.
    #[error("no inventory configured for {0}")]
    NotConfigured(NaiveDate),

    /// A day in the range cannot absorb the requested quantity (sold out,
    /// closed, or a retried race that never won).
    #[error("capacity unavailable on {0}")]
    CapacityUnavailable(NaiveDate),

    /// Catalog lookup failed while add-on pricing depended on it.
    #[error("catalog unavailable: {0}")]
    Catalog(String),

    /// Booking write failed after a successful reservation; the holds were
    /// released before this surfaced.
    #[error("booking could not be persisted: {0}")]
    PersistenceFailed(String),

    /// Any other storage failure.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<DomainError> for BookingError {
    fn from(value: DomainError) -> Self {
        // Everything the domain layer rejects at this boundary is a request
        // problem: validation, range, id parse.
        BookingError::InvalidRequest(value.to_string())
    }
}

/// Map a reservation failure, attributing a residual lost race to the first
/// day of the stay.
fn map_reserve_error(err: StoreError, first_day: NaiveDate) -> BookingError {
    match err {
        StoreError::NotConfigured(date) => BookingError::NotConfigured(date),
        StoreError::InsufficientCapacity(date) | StoreError::Closed(date) => {
            BookingError::CapacityUnavailable(date)
        }
        StoreError::RaceLost(_) => BookingError::CapacityUnavailable(first_day),
        other => BookingError::Storage(other.to_string()),
    }
}

/// The transactional core: validates, reserves, prices and persists a
/// booking against live inventory.
///
/// Generic over the store and gateway traits; wiring injects either the
/// Postgres or the in-memory implementations once at construction.
#[derive(Debug)]
pub struct BookingAllocator<I, B, C> {
    inventory: I,
    bookings: B,
    catalog: C,
}

impl<I, B, C> BookingAllocator<I, B, C> {
    pub fn new(inventory: I, bookings: B, catalog: C) -> Self {
        Self {
            inventory,
            bookings,
            catalog,
        }
    }
}

impl<I, B, C> BookingAllocator<I, B, C>
where
    I: InventoryStore,
    B: BookingStore,
    C: CatalogGateway,
{
    /// Run one booking attempt end to end.
    ///
    /// The requested quantity must be available simultaneously on *every*
    /// day of the range; a single short day rejects the whole attempt.
    #[instrument(
        skip(self, request),
        fields(product_id = %request.product_id, quantity = request.quantity),
        err
    )]
    pub async fn create_booking(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        // 1) Validate (no storage touched on failure)
        let range = request.validate()?;
        let days: Vec<NaiveDate> = range.days().collect();

        // 2) Resolve add-ons (unit prices come from the catalog)
        let add_ons = self.resolve_add_ons(&request).await?;

        // 3) Reserve, all-or-nothing, with bounded retry on transient races
        let reserved = self.reserve_with_retry(request.product_id, &days, request.quantity, range.from()).await?;

        let first = reserved
            .first()
            .ok_or_else(|| BookingError::Storage("reservation returned no entries".to_string()))?;
        let currency = first.currency.clone();
        if reserved.iter().any(|entry| entry.currency != currency) {
            // Data-integrity condition, not a booking failure: charge in the
            // first day's currency and flag the inventory for repair.
            tracing::warn!(
                product_id = %request.product_id,
                currency = %currency,
                "inventory entries disagree on currency across the stay"
            );
        }

        // 4) Price from the reserved entries, never from stale availability
        let day_prices: Vec<DayPrice> = reserved
            .iter()
            .map(|entry| DayPrice {
                date: entry.date,
                unit_price: entry.unit_price,
            })
            .collect();
        let total_price = pricing::price(
            request.kind,
            &day_prices,
            request.quantity,
            &add_ons,
            range.nights(),
            request.guest_count,
        );

        // 5) Persist; compensate the reservation on any terminal failure
        for attempt in 0..MAX_REFERENCE_ATTEMPTS {
            let booking = Booking {
                reference: BookingReference::generate(),
                product_id: request.product_id,
                kind: request.kind,
                check_in: request.check_in,
                check_out: request.check_out,
                quantity: request.quantity,
                guest: GuestDetails {
                    name: request.guest_name.clone(),
                    email: request.guest_email.clone(),
                    phone: request.guest_phone.clone(),
                },
                total_price,
                currency: currency.clone(),
                status: BookingStatus::Confirmed,
                created_at: Utc::now(),
                add_ons: add_ons.clone(),
            };

            match self.bookings.insert(&booking).await {
                Ok(()) => {
                    tracing::info!(
                        reference = %booking.reference,
                        total_price,
                        nights = range.nights(),
                        "booking confirmed"
                    );
                    return Ok(booking);
                }
                Err(StoreError::DuplicateReference(reference)) => {
                    tracing::warn!(%reference, attempt, "booking reference collision, regenerating");
                }
                Err(err) => {
                    self.release_reservation(request.product_id, &days, request.quantity).await;
                    return Err(BookingError::PersistenceFailed(err.to_string()));
                }
            }
        }

        self.release_reservation(request.product_id, &days, request.quantity).await;
        Err(BookingError::PersistenceFailed(
            "could not generate a unique booking reference".to_string(),
        ))
    }

    async fn reserve_with_retry(
        &self,
        product_id: ProductId,
        days: &[NaiveDate],
        quantity: u32,
        first_day: NaiveDate,
    ) -> Result<Vec<InventoryEntry>, BookingError> {
        let mut attempt = 0;
        loop {
            match self.inventory.reserve(product_id, days, quantity).await {
                Ok(reserved) => return Ok(reserved),
                Err(StoreError::RaceLost(reason)) if attempt + 1 < MAX_RESERVE_ATTEMPTS => {
                    attempt += 1;
                    tracing::debug!(%reason, attempt, "reservation race lost, retrying");
                }
                Err(err) => return Err(map_reserve_error(err, first_day)),
            }
        }
    }

    /// Compensating release. The original booking failure is already
    /// surfacing, so a failure here is logged for repair rather than
    /// propagated.
    async fn release_reservation(&self, product_id: ProductId, days: &[NaiveDate], quantity: u32) {
        if let Err(err) = self.inventory.release(product_id, days, quantity).await {
            tracing::error!(
                %product_id,
                quantity,
                error = %err,
                "failed to release reservation after persistence failure; inventory needs repair"
            );
        }
    }

    async fn resolve_add_ons(
        &self,
        request: &BookingRequest,
    ) -> Result<Vec<AddOnSelection>, BookingError> {
        if request.add_ons.is_empty() {
            return Ok(vec![]);
        }

        let product = self
            .catalog
            .product(request.product_id)
            .await
            .map_err(|e| BookingError::Catalog(e.to_string()))?
            .ok_or_else(|| {
                BookingError::InvalidRequest(format!("unknown product {}", request.product_id))
            })?;
        let hotel_id = product.hotel_id.ok_or_else(|| {
            BookingError::InvalidRequest(format!(
                "product {} offers no add-ons",
                request.product_id
            ))
        })?;

        let available = self
            .catalog
            .add_ons(hotel_id)
            .await
            .map_err(|e| BookingError::Catalog(e.to_string()))?;

        request
            .add_ons
            .iter()
            .map(|requested| {
                let add_on = available
                    .iter()
                    .find(|candidate| candidate.id == requested.add_on_id)
                    .ok_or_else(|| {
                        BookingError::InvalidRequest(format!(
                            "unknown add-on {}",
                            requested.add_on_id
                        ))
                    })?;
                Ok(AddOnSelection {
                    add_on_id: add_on.id,
                    name: add_on.name.clone(),
                    unit_price: add_on.unit_price,
                    kind: add_on.kind,
                    quantity: requested.quantity,
                })
            })
            .collect()
    }
}
