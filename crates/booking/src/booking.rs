use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stayforge_catalog::{AddOnKind, ProductKind};
use stayforge_core::{AddOnId, CurrencyCode, DateRange, ProductId};

use crate::reference::BookingReference;

/// Booking status lifecycle.
///
/// Transitions out of `Confirmed` are not part of the booking flow; whatever
/// performs them must release (Cancelled) or finalize (Completed) the
/// reserved capacity through the inventory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

/// Guest contact fields carried on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// An add-on choice with its pricing data resolved at booking time.
///
/// Name and unit price are frozen here: later catalog edits must not change
/// what an existing booking was charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnSelection {
    pub add_on_id: AddOnId,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    pub kind: AddOnKind,
    pub quantity: u32,
}

/// A confirmed reservation of capacity, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub reference: BookingReference,
    pub product_id: ProductId,
    pub kind: ProductKind,
    pub check_in: NaiveDate,
    /// Absent for single-day products (fixed-date events, same-day stays).
    pub check_out: Option<NaiveDate>,
    pub quantity: u32,
    pub guest: GuestDetails,
    /// Price in smallest currency unit (e.g., cents).
    pub total_price: u64,
    pub currency: CurrencyCode,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub add_ons: Vec<AddOnSelection>,
}

impl Booking {
    /// The half-open day range this booking holds capacity for.
    pub fn stay_range(&self) -> DateRange {
        match self.check_out {
            Some(out) if out > self.check_in => {
                // Invariant upheld at validation: check_out > check_in here.
                DateRange::new(self.check_in, out).unwrap_or_else(|_| DateRange::single_day(self.check_in))
            }
            _ => DateRange::single_day(self.check_in),
        }
    }

    /// Whether this booking currently holds reserved capacity on `date`.
    pub fn holds_capacity_on(&self, date: NaiveDate) -> bool {
        self.status == BookingStatus::Confirmed && self.stay_range().contains(date)
    }
}
