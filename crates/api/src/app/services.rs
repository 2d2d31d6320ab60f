use std::sync::Arc;

use sqlx::PgPool;

use stayforge_catalog::{CatalogGateway, StaticCatalog};
use stayforge_infra::{
    AvailabilityService, BookingAllocator, BookingStore, InMemoryBookingStore,
    InMemoryInventoryStore, InventoryStore, PostgresBookingStore, PostgresInventoryStore,
    schema::ensure_schema,
};

type Allocator =
    BookingAllocator<Arc<dyn InventoryStore>, Arc<dyn BookingStore>, Arc<dyn CatalogGateway>>;

/// The wired engine behind the HTTP handlers.
///
/// Stores and the catalog are capability interfaces injected at
/// construction; the backend is selected once at process wiring
/// ([`build_services`]), never re-checked per call.
pub struct AppServices {
    inventory: Arc<dyn InventoryStore>,
    bookings: Arc<dyn BookingStore>,
    allocator: Allocator,
    availability: AvailabilityService<Arc<dyn InventoryStore>>,
}

impl AppServices {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        bookings: Arc<dyn BookingStore>,
        catalog: Arc<dyn CatalogGateway>,
    ) -> Self {
        let allocator = BookingAllocator::new(inventory.clone(), bookings.clone(), catalog);
        let availability = AvailabilityService::new(inventory.clone());
        Self {
            inventory,
            bookings,
            allocator,
            availability,
        }
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    pub fn availability(&self) -> &AvailabilityService<Arc<dyn InventoryStore>> {
        &self.availability
    }

    pub fn bookings(&self) -> &Arc<dyn BookingStore> {
        &self.bookings
    }

    pub fn inventory(&self) -> &Arc<dyn InventoryStore> {
        &self.inventory
    }
}

/// Select the backend from the environment, once, at startup.
pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        build_postgres_services().await
    } else {
        tracing::warn!("USE_PERSISTENT_STORES not set; using in-memory stores (dev only)");
        build_in_memory_services()
    }
}

/// In-memory wiring (dev/test): nothing survives a restart.
pub fn build_in_memory_services() -> AppServices {
    AppServices::new(
        Arc::new(InMemoryInventoryStore::new()),
        Arc::new(InMemoryBookingStore::new()),
        Arc::new(StaticCatalog::new()),
    )
}

/// Postgres wiring: connect, ensure the schema, hand out the stores.
///
/// A live catalog provider would be constructed here in place of the static
/// one; the rest of the engine only sees the trait.
pub async fn build_postgres_services() -> AppServices {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("failed to connect to Postgres");

    ensure_schema(&pool).await.expect("failed to ensure schema");

    AppServices::new(
        Arc::new(PostgresInventoryStore::new(pool.clone())),
        Arc::new(PostgresBookingStore::new(pool)),
        Arc::new(StaticCatalog::new()),
    )
}
