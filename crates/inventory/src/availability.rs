use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stayforge_core::{CurrencyCode, DateRange, ProductId};

use crate::entry::DaySlot;

/// Why a day is (or is not) bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Available,
    SoldOut,
    Closed,
    /// No inventory row exists for this day. Distinct from sold out: the
    /// product was never put on sale here.
    NotConfigured,
}

/// Derived per-day view. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityDay {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub available: bool,
    pub units_available: u32,
    /// Absent for not-configured days.
    pub unit_price: Option<u64>,
}

/// The availability view over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCalendar {
    pub product_id: ProductId,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Currency of the first configured day. Entries are expected to share a
    /// currency; see `currency_mismatch`.
    pub currency: Option<CurrencyCode>,
    /// Data-integrity condition: days disagreed on currency. The calendar is
    /// still returned (with the first day's currency); callers log/flag it.
    pub currency_mismatch: bool,
    pub days: Vec<AvailabilityDay>,
}

/// Fold inventory slots for `[range.from, range.to)` into a calendar.
///
/// Pure and read-only; slots are expected in ascending date order, one per
/// day of the range, as produced by the inventory store.
pub fn aggregate(product_id: ProductId, range: DateRange, slots: &[DaySlot]) -> AvailabilityCalendar {
    let mut currency: Option<CurrencyCode> = None;
    let mut currency_mismatch = false;

    let days = slots
        .iter()
        .map(|slot| match slot {
            DaySlot::Configured(entry) => {
                match &currency {
                    None => currency = Some(entry.currency.clone()),
                    Some(c) if *c != entry.currency => currency_mismatch = true,
                    Some(_) => {}
                }

                let status = if entry.closed {
                    DayStatus::Closed
                } else if entry.remaining() == 0 {
                    DayStatus::SoldOut
                } else {
                    DayStatus::Available
                };

                AvailabilityDay {
                    date: entry.date,
                    status,
                    available: status == DayStatus::Available,
                    units_available: if entry.closed { 0 } else { entry.remaining() },
                    unit_price: Some(entry.unit_price),
                }
            }
            DaySlot::Missing(date) => AvailabilityDay {
                date: *date,
                status: DayStatus::NotConfigured,
                available: false,
                units_available: 0,
                unit_price: None,
            },
        })
        .collect();

    AvailabilityCalendar {
        product_id,
        from: range.from(),
        to: range.to(),
        currency,
        currency_mismatch,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::InventoryEntry;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn eur() -> CurrencyCode {
        CurrencyCode::new("EUR").unwrap()
    }

    fn entry(product_id: ProductId, date: &str, total: u32, booked: u32) -> InventoryEntry {
        let mut e = InventoryEntry::new(product_id, d(date), total, 10_000, eur());
        e.booked_capacity = booked;
        e
    }

    #[test]
    fn missing_day_is_not_configured_and_distinct_from_sold_out() {
        let pid = ProductId::new();
        let range = DateRange::new(d("2026-07-10"), d("2026-07-13")).unwrap();
        let slots = vec![
            DaySlot::Configured(entry(pid, "2026-07-10", 2, 2)),
            DaySlot::Missing(d("2026-07-11")),
            DaySlot::Configured(entry(pid, "2026-07-12", 0, 0)),
        ];

        let cal = aggregate(pid, range, &slots);
        assert_eq!(cal.days[0].status, DayStatus::SoldOut);
        assert_eq!(cal.days[1].status, DayStatus::NotConfigured);
        // total_capacity = 0 is sold out, not "not configured".
        assert_eq!(cal.days[2].status, DayStatus::SoldOut);
        assert!(cal.days.iter().all(|day| !day.available));
    }

    #[test]
    fn closed_day_reports_zero_units() {
        let pid = ProductId::new();
        let range = DateRange::new(d("2026-07-10"), d("2026-07-11")).unwrap();
        let mut e = entry(pid, "2026-07-10", 5, 1);
        e.closed = true;
        let cal = aggregate(pid, range, &[DaySlot::Configured(e)]);

        assert_eq!(cal.days[0].status, DayStatus::Closed);
        assert_eq!(cal.days[0].units_available, 0);
        assert!(!cal.days[0].available);
    }

    #[test]
    fn currency_comes_from_first_configured_day() {
        let pid = ProductId::new();
        let range = DateRange::new(d("2026-07-10"), d("2026-07-12")).unwrap();
        let slots = vec![
            DaySlot::Missing(d("2026-07-10")),
            DaySlot::Configured(entry(pid, "2026-07-11", 3, 0)),
        ];

        let cal = aggregate(pid, range, &slots);
        assert_eq!(cal.currency, Some(eur()));
        assert!(!cal.currency_mismatch);
    }

    #[test]
    fn currency_mismatch_is_flagged_not_fatal() {
        let pid = ProductId::new();
        let range = DateRange::new(d("2026-07-10"), d("2026-07-12")).unwrap();
        let mut second = entry(pid, "2026-07-11", 3, 0);
        second.currency = CurrencyCode::new("USD").unwrap();
        let slots = vec![
            DaySlot::Configured(entry(pid, "2026-07-10", 3, 0)),
            DaySlot::Configured(second),
        ];

        let cal = aggregate(pid, range, &slots);
        assert_eq!(cal.currency, Some(eur()));
        assert!(cal.currency_mismatch);
        assert_eq!(cal.days.len(), 2);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let pid = ProductId::new();
        let range = DateRange::new(d("2026-07-10"), d("2026-07-12")).unwrap();
        let slots = vec![
            DaySlot::Configured(entry(pid, "2026-07-10", 4, 1)),
            DaySlot::Configured(entry(pid, "2026-07-11", 4, 4)),
        ];

        assert_eq!(aggregate(pid, range, &slots), aggregate(pid, range, &slots));
    }
}
