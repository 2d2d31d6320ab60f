//! Pricing calculator.
//!
//! Pure arithmetic over integer minor currency units; no floating point
//! anywhere near money.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stayforge_catalog::{AddOnKind, ProductKind};

use crate::booking::AddOnSelection;

/// Per-day price input, fixed at reservation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPrice {
    pub date: NaiveDate,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
}

/// Total price for a stay.
///
/// Base price: `unit_price × quantity` on every day of a room stay. A
/// fixed-date event has no per-day semantics and is charged
/// `unit_price × quantity` once. (Per-day quantity multiplication is the
/// documented behavior, not an option.)
///
/// Add-on price per selection is `unit_price × quantity × multiplier`:
/// 1 for one-time and per-unit, `nights` (≥ 1) for per-night, `guest_count`
/// for per-person.
pub fn price(
    kind: ProductKind,
    days: &[DayPrice],
    quantity: u32,
    add_ons: &[AddOnSelection],
    nights: u32,
    guest_count: u32,
) -> u64 {
    let quantity = u64::from(quantity);

    let base: u64 = match kind {
        ProductKind::Room => days.iter().map(|day| day.unit_price * quantity).sum(),
        ProductKind::Event => days.first().map(|day| day.unit_price * quantity).unwrap_or(0),
    };

    let add_on_total: u64 = add_ons
        .iter()
        .map(|selection| {
            let multiplier = match selection.kind {
                AddOnKind::OneTime | AddOnKind::PerUnit => 1,
                AddOnKind::PerNight => u64::from(nights.max(1)),
                AddOnKind::PerPerson => u64::from(guest_count),
            };
            selection.unit_price * u64::from(selection.quantity) * multiplier
        })
        .sum();

    base + add_on_total
}
