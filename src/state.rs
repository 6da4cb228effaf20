use std::sync::Arc;

use crate::{
    db::{DbPool, create_orm_conn},
    services::locks::ProductLocks,
    store::{
        CartStore, CatalogStore, MemoryCartStore, MemoryCatalogStore, PgCartStore,
        PgCatalogStore,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub cart: Arc<dyn CartStore>,
    pub cart_locks: Arc<ProductLocks>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>, cart: Arc<dyn CartStore>) -> Self {
        Self {
            catalog,
            cart,
            cart_locks: Arc::new(ProductLocks::new()),
        }
    }

    pub fn postgres(pool: DbPool) -> Self {
        let orm = create_orm_conn(&pool);
        Self::new(
            Arc::new(PgCatalogStore::new(orm)),
            Arc::new(PgCartStore::new(pool)),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryCatalogStore::new()),
            Arc::new(MemoryCartStore::new()),
        )
    }
}
