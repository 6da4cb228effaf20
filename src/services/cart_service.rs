use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartAddition, CartList, CartSummary},
    error::{AppError, AppResult},
    models::CartLine,
    response::ApiResponse,
    state::AppState,
    validation::parse_product_id,
};

pub async fn list_cart(state: &AppState) -> AppResult<ApiResponse<CartList>> {
    let items = joined_lines(state).await?;
    Ok(ApiResponse::success(CartList { items }))
}

/// Adds one unit of a product: bumps the existing line or creates a new one.
///
/// The lookup and the write run under the product's lock, so concurrent adds
/// of the same product always end up as a single line.
pub async fn add_to_cart(state: &AppState, payload: AddToCartRequest) -> AppResult<CartAddition> {
    let product_id = parse_product_id(payload.product_id)?;

    let product = match state.catalog.find(product_id).await? {
        Some(p) => p,
        None => return Err(AppError::product_not_found()),
    };

    let _guard = state.cart_locks.acquire(product_id).await;

    if let Some(mut entry) = state.cart.find_by_product(product_id).await? {
        entry.quantity = entry
            .quantity
            .checked_add(1)
            .ok_or_else(|| AppError::Validation("Cart quantity limit reached".into()))?;

        // `None` means the line was removed or the cart cleared since the
        // lookup; start a fresh line below.
        if let Some(entry) = state.cart.save(&entry).await? {
            tracing::debug!(
                cart_id = %entry.id,
                %product_id,
                quantity = entry.quantity,
                "cart line incremented"
            );
            return Ok(CartAddition::Incremented(CartLine::join(entry, Some(product))));
        }
        tracing::debug!(cart_id = %entry.id, %product_id, "cart line vanished before increment");
    }

    let entry = state.cart.create(product_id).await?;
    tracing::debug!(cart_id = %entry.id, %product_id, "cart line created");
    Ok(CartAddition::Created(CartLine::join(entry, Some(product))))
}

pub async fn remove_from_cart(
    state: &AppState,
    cart_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if state.cart.get(cart_id).await?.is_none() {
        return Err(AppError::cart_item_not_found());
    }
    if !state.cart.delete(cart_id).await? {
        return Err(AppError::cart_item_not_found());
    }

    tracing::debug!(%cart_id, "cart line removed");
    Ok(ApiResponse::confirmation("Item removed from cart"))
}

pub async fn clear_cart(state: &AppState) -> AppResult<ApiResponse<serde_json::Value>> {
    let removed = state.cart.delete_all().await?;
    tracing::debug!(removed, "cart cleared");
    Ok(ApiResponse::confirmation("Cart cleared"))
}

pub async fn cart_summary(state: &AppState) -> AppResult<ApiResponse<CartSummary>> {
    let lines = joined_lines(state).await?;
    Ok(ApiResponse::success(CartSummary {
        count: cart_count(&lines),
        total: cart_total(&lines),
    }))
}

/// Sum of price × quantity over lines whose product still exists.
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .filter_map(|line| {
            line.product
                .as_ref()
                .map(|product| product.price * Decimal::from(line.quantity))
        })
        .sum::<Decimal>()
        .round_dp(2)
}

/// Sum of quantities over every line, resolved or not.
pub fn cart_count(lines: &[CartLine]) -> i64 {
    lines.iter().map(|line| i64::from(line.quantity)).sum()
}

async fn joined_lines(state: &AppState) -> AppResult<Vec<CartLine>> {
    let entries = state.cart.list().await?;

    let mut ids: Vec<Uuid> = entries.iter().map(|e| e.product_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let products: HashMap<Uuid, _> = state
        .catalog
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let lines = entries
        .into_iter()
        .map(|entry| {
            let product = products.get(&entry.product_id).cloned();
            CartLine::join(entry, product)
        })
        .collect();
    Ok(lines)
}
