use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stayforge_catalog::ProductKind;
use stayforge_core::{AddOnId, DateRange, DomainError, DomainResult, ProductId};

/// A requested add-on, before catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnRequest {
    pub add_on_id: AddOnId,
    pub quantity: u32,
}

/// What a guest asks for. Validated before any storage is touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub product_id: ProductId,
    pub kind: ProductKind,
    pub check_in: NaiveDate,
    /// Omitted (or equal to `check_in`) for a single-day stay.
    pub check_out: Option<NaiveDate>,
    pub quantity: u32,
    /// Number of guests, for per-person add-on pricing.
    pub guest_count: u32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub add_ons: Vec<AddOnRequest>,
}

impl BookingRequest {
    /// Validate the request and derive the stay range it reserves.
    ///
    /// check_out == check_in (or absent) means a one-night, single-day stay.
    /// Fixed-date events must be single-day.
    pub fn validate(&self) -> DomainResult<DateRange> {
        if self.quantity < 1 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        if self.guest_count < 1 {
            return Err(DomainError::validation("guest_count must be at least 1"));
        }
        if self.guest_name.trim().is_empty() {
            return Err(DomainError::validation("guest name cannot be empty"));
        }
        let email = self.guest_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("guest email is malformed"));
        }
        for (idx, add_on) in self.add_ons.iter().enumerate() {
            if add_on.quantity < 1 {
                return Err(DomainError::validation(format!(
                    "add-on quantity must be at least 1 (index {idx})"
                )));
            }
        }

        match self.check_out {
            None => Ok(DateRange::single_day(self.check_in)),
            Some(out) if out == self.check_in => Ok(DateRange::single_day(self.check_in)),
            Some(out) => {
                if self.kind == ProductKind::Event {
                    return Err(DomainError::validation(
                        "a fixed-date event cannot span multiple days",
                    ));
                }
                if out < self.check_in {
                    return Err(DomainError::invalid_range(format!(
                        "check_out ({out}) is before check_in ({})",
                        self.check_in
                    )));
                }
                DateRange::new(self.check_in, out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn valid_request() -> BookingRequest {
        BookingRequest {
            product_id: ProductId::new(),
            kind: ProductKind::Room,
            check_in: d("2026-07-10"),
            check_out: Some(d("2026-07-12")),
            quantity: 2,
            guest_count: 2,
            guest_name: "Ada Lovelace".to_string(),
            guest_email: "ada@example.com".to_string(),
            guest_phone: None,
            add_ons: vec![],
        }
    }

    #[test]
    fn valid_request_yields_stay_range() {
        let range = valid_request().validate().unwrap();
        assert_eq!(range.from(), d("2026-07-10"));
        assert_eq!(range.to(), d("2026-07-12"));
        assert_eq!(range.nights(), 2);
    }

    #[test]
    fn same_day_stay_is_one_night() {
        let mut request = valid_request();
        request.check_out = Some(request.check_in);
        assert_eq!(request.validate().unwrap().nights(), 1);

        request.check_out = None;
        assert_eq!(request.validate().unwrap().nights(), 1);
    }

    #[test]
    fn rejects_zero_quantity() {
        let mut request = valid_request();
        request.quantity = 0;
        assert!(matches!(
            request.validate().unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn rejects_check_out_before_check_in() {
        let mut request = valid_request();
        request.check_out = Some(d("2026-07-09"));
        assert!(matches!(
            request.validate().unwrap_err(),
            DomainError::InvalidRange(_)
        ));
    }

    #[test]
    fn rejects_multi_day_event() {
        let mut request = valid_request();
        request.kind = ProductKind::Event;
        let err = request.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_missing_guest_contact() {
        let mut request = valid_request();
        request.guest_name = "   ".to_string();
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.guest_email = "not-an-email".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn rejects_zero_quantity_add_on() {
        let mut request = valid_request();
        request.add_ons.push(AddOnRequest {
            add_on_id: AddOnId::new(),
            quantity: 0,
        });
        assert!(request.validate().is_err());
    }
}
