use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use stayforge_core::{HotelId, ProductId};

use crate::types::{AddOn, ProductSummary};

/// Catalog lookup failure. Infrastructure-flavored: the catalog being down
/// is not a domain condition, and callers decide how hard to fail.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only capability for resolving product/add-on metadata.
///
/// Injected at construction; selection between the live provider and a
/// static double happens once at process wiring, never per call.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Resolve product metadata. `Ok(None)` means the catalog answered and
    /// does not know the product.
    async fn product(&self, product_id: ProductId) -> Result<Option<ProductSummary>, CatalogError>;

    /// Add-ons offered by a hotel.
    async fn add_ons(&self, hotel_id: HotelId) -> Result<Vec<AddOn>, CatalogError>;
}

#[async_trait]
impl<G> CatalogGateway for Arc<G>
where
    G: CatalogGateway + ?Sized,
{
    async fn product(&self, product_id: ProductId) -> Result<Option<ProductSummary>, CatalogError> {
        (**self).product(product_id).await
    }

    async fn add_ons(&self, hotel_id: HotelId) -> Result<Vec<AddOn>, CatalogError> {
        (**self).add_ons(hotel_id).await
    }
}

/// In-process catalog for tests/dev wiring.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    products: RwLock<HashMap<ProductId, ProductSummary>>,
    add_ons: RwLock<HashMap<HotelId, Vec<AddOn>>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, product: ProductSummary) {
        if let Ok(mut map) = self.products.write() {
            map.insert(product.id, product);
        }
    }

    pub fn insert_add_on(&self, hotel_id: HotelId, add_on: AddOn) {
        if let Ok(mut map) = self.add_ons.write() {
            map.entry(hotel_id).or_default().push(add_on);
        }
    }
}

#[async_trait]
impl CatalogGateway for StaticCatalog {
    async fn product(&self, product_id: ProductId) -> Result<Option<ProductSummary>, CatalogError> {
        let map = self
            .products
            .read()
            .map_err(|_| CatalogError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.get(&product_id).cloned())
    }

    async fn add_ons(&self, hotel_id: HotelId) -> Result<Vec<AddOn>, CatalogError> {
        let map = self
            .add_ons
            .read()
            .map_err(|_| CatalogError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.get(&hotel_id).cloned().unwrap_or_default())
    }
}
