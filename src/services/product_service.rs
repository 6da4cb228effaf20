use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::{AppError, AppResult},
    models::Product,
    response::ApiResponse,
    state::AppState,
    validation::{validate_changes, validate_new_product},
};

pub async fn list_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let items = state.catalog.list().await?;
    Ok(ApiResponse::success(ProductList { items }))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = match state.catalog.find(id).await? {
        Some(p) => p,
        None => return Err(AppError::product_not_found()),
    };
    Ok(ApiResponse::success(product))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let new_product = validate_new_product(payload)?;
    let product = state.catalog.insert(new_product).await?;

    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    Ok(ApiResponse::success(product))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let changes = validate_changes(payload)?;

    let mut product = match state.catalog.find(id).await? {
        Some(p) => p,
        None => return Err(AppError::product_not_found()),
    };
    product.apply(changes);

    let product = state
        .catalog
        .save(&product)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    tracing::info!(product_id = %product.id, "product updated");
    Ok(ApiResponse::success(product))
}

/// Cart entries referencing the product are left in place.
pub async fn delete_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if state.catalog.find(id).await?.is_none() {
        return Err(AppError::product_not_found());
    }
    if !state.catalog.delete(id).await? {
        return Err(AppError::product_not_found());
    }

    tracing::info!(product_id = %id, "product deleted");
    Ok(ApiResponse::confirmation("Product deleted successfully"))
}
