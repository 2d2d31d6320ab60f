use serde::{Deserialize, Serialize};

use stayforge_core::{AddOnId, CurrencyCode, HotelId, ProductId};

/// What kind of thing a product is. Rooms are booked per night over a range;
/// events are fixed-date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Room,
    Event,
}

/// Product metadata as resolved by the content provider.
///
/// Best-effort enrichment: capacity and pricing arithmetic never depend on
/// it, except that add-on unit prices are resolved through the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub hotel_id: Option<HotelId>,
    pub name: String,
    pub kind: ProductKind,
    pub base_price_hint: Option<u64>, // Price in smallest currency unit (e.g., cents)
    pub currency: Option<CurrencyCode>,
}

/// How an add-on's unit price is multiplied into a booking total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOnKind {
    OneTime,
    PerUnit,
    PerNight,
    PerPerson,
}

/// An optional priced extra attached to a hotel's products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: AddOnId,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    pub kind: AddOnKind,
}
