//! Catalog gateway — product and add-on metadata lookup.
//!
//! Content is owned by an external provider; the engine only consumes the
//! narrow read contract in [`CatalogGateway`]. The implementation is chosen
//! once at process wiring and injected at construction (a live HTTP variant
//! lives with the transport deployment; [`StaticCatalog`] serves tests/dev).

pub mod gateway;
pub mod types;

pub use gateway::{CatalogError, CatalogGateway, StaticCatalog};
pub use types::{AddOn, AddOnKind, ProductKind, ProductSummary};
