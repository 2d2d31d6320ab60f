use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stayforge_core::{DomainError, DomainResult};

/// Human-presentable booking reference, e.g. `BK-0198-C2D4E6F8A1B3`.
///
/// Derived from a UUIDv7: a time-ordered prefix plus a random tail, so
/// references sort roughly by creation time and collisions are vanishingly
/// rare. The booking store's unique index is the hard backstop; the
/// allocator regenerates on a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingReference(String);

impl BookingReference {
    pub fn generate() -> Self {
        let hex = Uuid::now_v7().simple().to_string().to_ascii_uppercase();
        Self(format!("BK-{}-{}", &hex[..4], &hex[20..32]))
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        let rest = s
            .strip_prefix("BK-")
            .ok_or_else(|| DomainError::invalid_id(format!("booking reference: {s:?}")))?;
        let well_formed = rest.len() == 17
            && rest.as_bytes()[4] == b'-'
            && rest
                .chars()
                .enumerate()
                .all(|(i, c)| i == 4 || c.is_ascii_hexdigit() && !c.is_ascii_lowercase());
        if !well_formed {
            return Err(DomainError::invalid_id(format!("booking reference: {s:?}")));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for BookingReference {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for BookingReference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
