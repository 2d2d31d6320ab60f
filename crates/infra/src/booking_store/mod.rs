//! Booking persistence.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryBookingStore;
pub use postgres::PostgresBookingStore;
pub use r#trait::BookingStore;
