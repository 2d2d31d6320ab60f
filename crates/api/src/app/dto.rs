use serde::Deserialize;

use stayforge_booking::{AddOnRequest, Booking, BookingRequest};
use stayforge_catalog::ProductKind;
use stayforge_inventory::AvailabilityCalendar;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct GuestDto {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddOnRequestDto {
    pub add_on_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub product_id: String,
    /// "room" (default) or "event".
    pub kind: Option<String>,
    pub check_in: String,
    pub check_out: Option<String>,
    pub quantity: u32,
    pub guest_count: Option<u32>,
    pub guest: GuestDto,
    #[serde(default)]
    pub add_ons: Vec<AddOnRequestDto>,
}

impl CreateBookingRequest {
    /// Parse into the domain request. Field-shape errors surface here;
    /// semantic validation happens in the allocator.
    pub fn into_domain(self) -> Result<BookingRequest, String> {
        let product_id = self
            .product_id
            .parse()
            .map_err(|_| "invalid product_id".to_string())?;

        let kind = match self.kind.as_deref() {
            None | Some("room") => ProductKind::Room,
            Some("event") => ProductKind::Event,
            Some(other) => return Err(format!("kind must be 'room' or 'event', got {other:?}")),
        };

        let check_in = parse_date(&self.check_in, "check_in")?;
        let check_out = self
            .check_out
            .as_deref()
            .map(|s| parse_date(s, "check_out"))
            .transpose()?;

        let add_ons = self
            .add_ons
            .into_iter()
            .map(|a| {
                Ok(AddOnRequest {
                    add_on_id: a.add_on_id.parse().map_err(|_| "invalid add_on_id".to_string())?,
                    quantity: a.quantity,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(BookingRequest {
            product_id,
            kind,
            check_in,
            check_out,
            quantity: self.quantity,
            guest_count: self.guest_count.unwrap_or(1),
            guest_name: self.guest.name,
            guest_email: self.guest.email,
            guest_phone: self.guest.phone,
            add_ons,
        })
    }
}

pub fn parse_date(s: &str, field: &str) -> Result<chrono::NaiveDate, String> {
    s.parse()
        .map_err(|_| format!("{field} must be a YYYY-MM-DD date, got {s:?}"))
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn availability_to_json(cal: AvailabilityCalendar) -> serde_json::Value {
    serde_json::json!({
        "product_id": cal.product_id.to_string(),
        "from": cal.from.to_string(),
        "to": cal.to.to_string(),
        "currency": cal.currency.as_ref().map(|c| c.as_str()),
        "currency_mismatch": cal.currency_mismatch,
        "days": cal.days.into_iter().map(|day| serde_json::json!({
            "date": day.date.to_string(),
            "status": match day.status {
                stayforge_inventory::DayStatus::Available => "available",
                stayforge_inventory::DayStatus::SoldOut => "sold_out",
                stayforge_inventory::DayStatus::Closed => "closed",
                stayforge_inventory::DayStatus::NotConfigured => "not_configured",
            },
            "available": day.available,
            "units_available": day.units_available,
            "unit_price": day.unit_price,
        })).collect::<Vec<_>>()
    })
}

pub fn booking_to_json(booking: Booking) -> serde_json::Value {
    serde_json::json!({
        "booking_reference": booking.reference.as_str(),
        "product_id": booking.product_id.to_string(),
        "kind": match booking.kind {
            ProductKind::Room => "room",
            ProductKind::Event => "event",
        },
        "check_in": booking.check_in.to_string(),
        "check_out": booking.check_out.map(|d| d.to_string()),
        "quantity": booking.quantity,
        "guest": {
            "name": booking.guest.name,
            "email": booking.guest.email,
            "phone": booking.guest.phone,
        },
        "total_price": booking.total_price,
        "currency": booking.currency.as_str(),
        "status": format!("{:?}", booking.status).to_lowercase(),
        "created_at": booking.created_at.to_rfc3339(),
        "add_ons": booking.add_ons.into_iter().map(|a| serde_json::json!({
            "add_on_id": a.add_on_id.to_string(),
            "name": a.name,
            "unit_price": a.unit_price,
            "kind": match a.kind {
                stayforge_catalog::AddOnKind::OneTime => "one_time",
                stayforge_catalog::AddOnKind::PerUnit => "per_unit",
                stayforge_catalog::AddOnKind::PerNight => "per_night",
                stayforge_catalog::AddOnKind::PerPerson => "per_person",
            },
            "quantity": a.quantity,
        })).collect::<Vec<_>>()
    })
}
