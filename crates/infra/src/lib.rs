//! `stayforge-infra` — persistence and the transactional booking core.
//!
//! Stores are trait-abstracted with Postgres and in-memory implementations;
//! the [`allocator::BookingAllocator`] composes them into the
//! validate → reserve → price → persist pipeline.

pub mod allocator;
pub mod availability;
pub mod booking_store;
pub mod error;
pub mod inventory_store;
pub mod schema;

mod integration_tests;

pub use allocator::{BookingAllocator, BookingError};
pub use availability::AvailabilityService;
pub use booking_store::{BookingStore, InMemoryBookingStore, PostgresBookingStore};
pub use error::StoreError;
pub use inventory_store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore};
