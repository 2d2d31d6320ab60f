//! Inventory domain module.
//!
//! This crate contains business rules for per-date capacity inventory,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod availability;
pub mod entry;

pub use availability::{AvailabilityCalendar, AvailabilityDay, DayStatus, aggregate};
pub use entry::{DaySlot, InventoryEntry};
