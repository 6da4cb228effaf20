use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use catalog_cart_api::{
    dto::{
        cart::{AddToCartRequest, CartAddition},
        products::{CreateProductRequest, UpdateProductRequest},
    },
    error::{AppError, AppResult},
    models::{CartEntry, Product},
    services::{cart_service, product_service},
    state::AppState,
    store::{CartStore, MemoryCartStore, MemoryCatalogStore},
};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

async fn create_product(state: &AppState, name: &str, price: serde_json::Value) -> Product {
    product_service::create_product(
        state,
        CreateProductRequest {
            name: Some(name.into()),
            price: Some(price),
            image: Some(format!("https://img.example/{name}.png")),
        },
    )
    .await
    .expect("create product")
    .data
    .expect("product data")
}

fn add(product_id: Uuid) -> AddToCartRequest {
    AddToCartRequest {
        product_id: Some(product_id.to_string()),
    }
}

async fn lines(state: &AppState) -> Vec<catalog_cart_api::models::CartLine> {
    cart_service::list_cart(state)
        .await
        .expect("list cart")
        .data
        .expect("cart data")
        .items
}

#[tokio::test]
async fn adding_same_product_twice_merges_into_one_line() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let mug = create_product(&state, "mug", json!(12)).await;

    let first = cart_service::add_to_cart(&state, add(mug.id)).await?;
    assert!(matches!(first, CartAddition::Created(_)));
    assert_eq!(first.line().quantity, 1);

    let second = cart_service::add_to_cart(&state, add(mug.id)).await?;
    assert!(matches!(second, CartAddition::Incremented(_)));
    assert_eq!(second.line().id, first.line().id);
    assert_eq!(second.line().quantity, 2);
    assert_eq!(second.line().product.as_ref().map(|p| p.id), Some(mug.id));

    let lines = lines(&state).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn distinct_products_get_their_own_lines() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let mut ids = Vec::new();
    for name in ["hoodie", "mug", "stickers", "ebook"] {
        let product = create_product(&state, name, json!("5.00")).await;
        cart_service::add_to_cart(&state, add(product.id)).await?;
        ids.push(product.id);
    }

    let lines = lines(&state).await;
    assert_eq!(lines.len(), ids.len());
    assert!(lines.iter().all(|line| line.quantity == 1));
    let mut seen: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    seen.sort();
    ids.sort();
    assert_eq!(seen, ids);
    Ok(())
}

#[tokio::test]
async fn unknown_product_is_not_added() {
    let state = AppState::in_memory();

    let err = cart_service::add_to_cart(&state, add(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Product not found"));
    assert!(lines(&state).await.is_empty());
}

#[tokio::test]
async fn missing_product_id_is_a_validation_error() {
    let state = AppState::in_memory();

    let err = cart_service::add_to_cart(&state, AddToCartRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_converge_to_one_line() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let mug = create_product(&state, "mug", json!(12)).await;

    let (a, b) = tokio::join!(
        cart_service::add_to_cart(&state, add(mug.id)),
        cart_service::add_to_cart(&state, add(mug.id)),
    );
    let mut outcomes = [a?, b?];
    outcomes.sort_by_key(|o| o.line().quantity);
    assert!(matches!(outcomes[0], CartAddition::Created(_)));
    assert!(matches!(outcomes[1], CartAddition::Incremented(_)));

    let lines = lines(&state).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    Ok(())
}

/// Cart store whose lookups stall, widening the window between
/// "no entry yet" and "create".
struct SlowCartStore {
    inner: MemoryCartStore,
}

#[async_trait]
impl CartStore for SlowCartStore {
    async fn find_by_product(&self, product_id: Uuid) -> AppResult<Option<CartEntry>> {
        let found = self.inner.find_by_product(product_id).await?;
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(found)
    }

    async fn create(&self, product_id: Uuid) -> AppResult<CartEntry> {
        self.inner.create(product_id).await
    }

    async fn save(&self, entry: &CartEntry) -> AppResult<Option<CartEntry>> {
        self.inner.save(entry).await
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<CartEntry>> {
        self.inner.get(id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.inner.delete(id).await
    }

    async fn delete_all(&self) -> AppResult<u64> {
        self.inner.delete_all().await
    }

    async fn list(&self) -> AppResult<Vec<CartEntry>> {
        self.inner.list().await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_adds_lose_no_updates() -> anyhow::Result<()> {
    let state = AppState::new(
        Arc::new(MemoryCatalogStore::new()),
        Arc::new(SlowCartStore {
            inner: MemoryCartStore::new(),
        }),
    );
    let mug = create_product(&state, "mug", json!(12)).await;
    let hoodie = create_product(&state, "hoodie", json!(55)).await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let state = state.clone();
        let product_id = if i % 2 == 0 { mug.id } else { hoodie.id };
        tasks.push(tokio::spawn(async move {
            cart_service::add_to_cart(&state, add(product_id)).await
        }));
    }
    for task in tasks {
        task.await??;
    }

    let lines = lines(&state).await;
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.quantity == 10));
    assert_eq!(state.cart_locks.active(), 0);
    Ok(())
}

/// Cart store that empties itself right after a lookup finds a line, once
/// armed. Stands in for a `DELETE /api/cart` landing between lookup and save.
struct ClearingCartStore {
    inner: MemoryCartStore,
    armed: AtomicBool,
}

#[async_trait]
impl CartStore for ClearingCartStore {
    async fn find_by_product(&self, product_id: Uuid) -> AppResult<Option<CartEntry>> {
        let found = self.inner.find_by_product(product_id).await?;
        if found.is_some() && self.armed.swap(false, Ordering::SeqCst) {
            self.inner.delete_all().await?;
        }
        Ok(found)
    }

    async fn create(&self, product_id: Uuid) -> AppResult<CartEntry> {
        self.inner.create(product_id).await
    }

    async fn save(&self, entry: &CartEntry) -> AppResult<Option<CartEntry>> {
        self.inner.save(entry).await
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<CartEntry>> {
        self.inner.get(id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.inner.delete(id).await
    }

    async fn delete_all(&self) -> AppResult<u64> {
        self.inner.delete_all().await
    }

    async fn list(&self) -> AppResult<Vec<CartEntry>> {
        self.inner.list().await
    }
}

#[tokio::test]
async fn add_after_line_vanishes_starts_a_fresh_line() -> anyhow::Result<()> {
    let cart = Arc::new(ClearingCartStore {
        inner: MemoryCartStore::new(),
        armed: AtomicBool::new(false),
    });
    let state = AppState::new(Arc::new(MemoryCatalogStore::new()), cart.clone());
    let mug = create_product(&state, "mug", json!(12)).await;

    let first = cart_service::add_to_cart(&state, add(mug.id)).await?;
    assert!(matches!(first, CartAddition::Created(_)));

    cart.armed.store(true, Ordering::SeqCst);
    let second = cart_service::add_to_cart(&state, add(mug.id)).await?;
    assert!(matches!(second, CartAddition::Created(_)));
    assert_eq!(second.line().quantity, 1);
    assert_ne!(second.line().id, first.line().id);

    let lines = lines(&state).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].id, second.line().id);
    assert_eq!(lines[0].quantity, 1);
    assert_eq!(state.cart_locks.active(), 0);
    Ok(())
}

#[tokio::test]
async fn deleted_product_leaves_unresolved_line() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let mug = create_product(&state, "mug", json!(10)).await;
    let stickers = create_product(&state, "stickers", json!(5)).await;

    cart_service::add_to_cart(&state, add(mug.id)).await?;
    cart_service::add_to_cart(&state, add(mug.id)).await?;
    cart_service::add_to_cart(&state, add(stickers.id)).await?;

    let summary = cart_service::cart_summary(&state).await?.data.unwrap();
    assert_eq!(summary.count, 3);
    assert_eq!(summary.total, Decimal::new(2500, 2));

    product_service::delete_product(&state, stickers.id).await?;

    let lines = lines(&state).await;
    assert_eq!(lines.len(), 2);
    let orphan = lines
        .iter()
        .find(|line| line.product_id == stickers.id)
        .expect("entry survives product delete");
    assert!(orphan.product.is_none());
    assert!(!orphan.is_resolved());

    let summary = cart_service::cart_summary(&state).await?.data.unwrap();
    assert_eq!(summary.count, 3);
    assert_eq!(summary.total, Decimal::from(20));

    // Adding the deleted product again is refused; the orphan is untouched.
    let err = cart_service::add_to_cart(&state, add(stickers.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn remove_and_clear() -> anyhow::Result<()> {
    let state = AppState::in_memory();

    cart_service::clear_cart(&state).await?;
    assert!(lines(&state).await.is_empty());

    let mug = create_product(&state, "mug", json!(12)).await;
    let hoodie = create_product(&state, "hoodie", json!(55)).await;
    let mug_line = cart_service::add_to_cart(&state, add(mug.id)).await?.into_line();
    cart_service::add_to_cart(&state, add(hoodie.id)).await?;

    cart_service::remove_from_cart(&state, mug_line.id).await?;
    let err = cart_service::remove_from_cart(&state, mug_line.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Cart item not found"));
    assert_eq!(lines(&state).await.len(), 1);

    let resp = cart_service::clear_cart(&state).await?;
    assert_eq!(resp.message.as_deref(), Some("Cart cleared"));
    cart_service::clear_cart(&state).await?;
    assert!(lines(&state).await.is_empty());

    // A fresh add after removal starts over at one.
    let again = cart_service::add_to_cart(&state, add(mug.id)).await?;
    assert!(matches!(again, CartAddition::Created(_)));
    assert_eq!(again.line().quantity, 1);
    Ok(())
}

#[tokio::test]
async fn product_crud_round() -> anyhow::Result<()> {
    let state = AppState::in_memory();

    for bad in [json!("abc"), json!(-5)] {
        let err = product_service::create_product(
            &state,
            CreateProductRequest {
                name: Some("mug".into()),
                price: Some(bad),
                image: Some("mug.png".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
    assert!(product_service::list_products(&state).await?.data.unwrap().items.is_empty());

    let cheap = create_product(&state, "penny", json!(0.01)).await;
    assert_eq!(cheap.price, Decimal::new(1, 2));

    let updated = product_service::update_product(
        &state,
        cheap.id,
        UpdateProductRequest {
            name: Some("nickel".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.name, "nickel");
    assert_eq!(updated.price, cheap.price);
    assert_eq!(updated.image, cheap.image);

    let err = product_service::update_product(
        &state,
        cheap.id,
        UpdateProductRequest {
            price: Some(json!(-1)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let fetched = product_service::get_product(&state, cheap.id).await?.data.unwrap();
    assert_eq!(fetched.name, "nickel");

    product_service::delete_product(&state, cheap.id).await?;
    assert!(matches!(
        product_service::get_product(&state, cheap.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        product_service::delete_product(&state, cheap.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        product_service::update_product(&state, cheap.id, UpdateProductRequest::default()).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}
