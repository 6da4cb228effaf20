use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    db::{DbPool, OrmConn},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::AppResult,
    models::{CartEntry, NewProduct, Product},
    store::{CartStore, CatalogStore},
};

/// Catalog backed by the `products` table through SeaORM.
#[derive(Clone)]
pub struct PgCatalogStore {
    orm: OrmConn,
}

impl PgCatalogStore {
    pub fn new(orm: OrmConn) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn insert(&self, product: NewProduct) -> AppResult<Product> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(product.name),
            price: Set(product.price),
            image: Set(product.image),
            created_at: NotSet,
        };
        let model = active.insert(&self.orm).await?;
        Ok(product_from_entity(model))
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Product>> {
        let product = Products::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(product_from_entity);
        Ok(product)
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products = Products::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(products)
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let products = Products::find()
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(products)
    }

    async fn save(&self, product: &Product) -> AppResult<Option<Product>> {
        let active = ActiveModel {
            id: Set(product.id),
            name: Set(product.name.clone()),
            price: Set(product.price),
            image: Set(product.image.clone()),
            created_at: NotSet,
        };
        match active.update(&self.orm).await {
            Ok(model) => Ok(Some(product_from_entity(model))),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = Products::delete_by_id(id).exec(&self.orm).await?;
        Ok(result.rows_affected > 0)
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: model.price,
        image: model.image,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Cart backed by the `cart_items` table through plain sqlx queries.
///
/// The table carries `UNIQUE (product_id)`, so a duplicate `create` from
/// another process surfaces as a database error instead of a second row.
#[derive(Clone)]
pub struct PgCartStore {
    pool: DbPool,
}

impl PgCartStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn find_by_product(&self, product_id: Uuid) -> AppResult<Option<CartEntry>> {
        let entry = sqlx::query_as::<_, CartEntry>(
            "SELECT id, product_id, quantity, created_at FROM cart_items WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn create(&self, product_id: Uuid) -> AppResult<CartEntry> {
        let entry = sqlx::query_as::<_, CartEntry>(
            r#"
            INSERT INTO cart_items (id, product_id, quantity)
            VALUES ($1, $2, 1)
            RETURNING id, product_id, quantity, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn save(&self, entry: &CartEntry) -> AppResult<Option<CartEntry>> {
        let saved = sqlx::query_as::<_, CartEntry>(
            r#"
            UPDATE cart_items
            SET quantity = $2
            WHERE id = $1
            RETURNING id, product_id, quantity, created_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.quantity)
        .fetch_optional(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<CartEntry>> {
        let entry = sqlx::query_as::<_, CartEntry>(
            "SELECT id, product_id, quantity, created_at FROM cart_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list(&self) -> AppResult<Vec<CartEntry>> {
        let entries = sqlx::query_as::<_, CartEntry>(
            "SELECT id, product_id, quantity, created_at FROM cart_items ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
