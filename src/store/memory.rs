use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{CartEntry, NewProduct, Product},
    store::{CartStore, CatalogStore},
};

/// In-process catalog. Products live in a `Vec` to keep insertion order.
#[derive(Default)]
pub struct MemoryCatalogStore {
    products: RwLock<Vec<Product>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn insert(&self, product: NewProduct) -> AppResult<Product> {
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            price: product.price,
            image: product.image,
            created_at: Utc::now(),
        };
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn save(&self, product: &Product) -> AppResult<Option<Product>> {
        let mut products = self.products.write().await;
        let Some(stored) = products.iter_mut().find(|p| p.id == product.id) else {
            return Ok(None);
        };
        stored.name = product.name.clone();
        stored.price = product.price;
        stored.image = product.image.clone();
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }
}

/// In-process cart.
///
/// `create` refuses a second entry for the same product, mirroring the
/// unique constraint of the Postgres table.
#[derive(Default)]
pub struct MemoryCartStore {
    entries: RwLock<Vec<CartEntry>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn find_by_product(&self, product_id: Uuid) -> AppResult<Option<CartEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.product_id == product_id).cloned())
    }

    async fn create(&self, product_id: Uuid) -> AppResult<CartEntry> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.product_id == product_id) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "cart entry for product {product_id} already exists"
            )));
        }
        let entry = CartEntry {
            id: Uuid::new_v4(),
            product_id,
            quantity: 1,
            created_at: Utc::now(),
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn save(&self, entry: &CartEntry) -> AppResult<Option<CartEntry>> {
        let mut entries = self.entries.write().await;
        let Some(stored) = entries.iter_mut().find(|e| e.id == entry.id) else {
            return Ok(None);
        };
        stored.quantity = entry.quantity;
        Ok(Some(stored.clone()))
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<CartEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() < before)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut entries = self.entries.write().await;
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }

    async fn list(&self) -> AppResult<Vec<CartEntry>> {
        Ok(self.entries.read().await.clone())
    }
}
