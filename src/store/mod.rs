//! Persistence seams for the catalog and the cart.
//!
//! Stores only persist. Existence checks, validation and the cart's
//! one-entry-per-product rule belong to the services, so both backends
//! report a miss as `None`/`false` rather than as an error.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CartEntry, NewProduct, Product},
};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCartStore, MemoryCatalogStore};
pub use postgres::{PgCartStore, PgCatalogStore};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, product: NewProduct) -> AppResult<Product>;

    async fn find(&self, id: Uuid) -> AppResult<Option<Product>>;

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Product>>;

    /// All products in insertion order.
    async fn list(&self) -> AppResult<Vec<Product>>;

    /// Overwrite name, price and image of an existing product.
    /// Returns `None` if the product vanished in the meantime.
    async fn save(&self, product: &Product) -> AppResult<Option<Product>>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_by_product(&self, product_id: Uuid) -> AppResult<Option<CartEntry>>;

    /// Insert a fresh entry with quantity 1.
    async fn create(&self, product_id: Uuid) -> AppResult<CartEntry>;

    /// Persist the entry's quantity. Returns `None` if the entry is gone.
    async fn save(&self, entry: &CartEntry) -> AppResult<Option<CartEntry>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<CartEntry>>;

    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Returns the number of removed entries.
    async fn delete_all(&self) -> AppResult<u64>;

    /// All entries, oldest first.
    async fn list(&self) -> AppResult<Vec<CartEntry>>;
}
