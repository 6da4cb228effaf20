use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, UpdateProductRequest},
    error::{AppError, AppResult},
    models::{NewProduct, ProductChanges},
};

const MISSING_FIELDS: &str = "Please provide name, price, and image";
const BAD_PRICE: &str = "Price must be a valid positive number";
const PRICE_OUT_OF_RANGE: &str =
    "Price must be below 10000000000 with at most 4 decimal places";

// Matches the `NUMERIC(14, 4)` price column.
const PRICE_MAX_SCALE: u32 = 4;
const PRICE_LIMIT: i64 = 10_000_000_000;

pub fn validate_new_product(payload: CreateProductRequest) -> AppResult<NewProduct> {
    let name = payload.name.and_then(non_blank);
    let image = payload.image.and_then(non_blank);
    let price = payload.price.filter(|p| !is_blank_value(p));

    let (Some(name), Some(price), Some(image)) = (name, price, image) else {
        return Err(AppError::Validation(MISSING_FIELDS.to_string()));
    };

    Ok(NewProduct {
        name,
        price: parse_price(&price)?,
        image,
    })
}

/// Supplied fields obey the same rules as on create; absent ones are skipped.
pub fn validate_changes(payload: UpdateProductRequest) -> AppResult<ProductChanges> {
    let name = match payload.name {
        Some(name) => Some(
            non_blank(name).ok_or_else(|| AppError::Validation("Name must not be empty".into()))?,
        ),
        None => None,
    };
    let image = match payload.image {
        Some(image) => Some(
            non_blank(image)
                .ok_or_else(|| AppError::Validation("Image must not be empty".into()))?,
        ),
        None => None,
    };
    let price = match payload.price {
        Some(Value::Null) | None => None,
        Some(price) => Some(parse_price(&price)?),
    };

    Ok(ProductChanges { name, price, image })
}

/// Accepts a JSON number or a numeric string; the result must be > 0 and fit
/// the price column.
pub fn parse_price(value: &Value) -> AppResult<Decimal> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(AppError::Validation(BAD_PRICE.to_string())),
    };

    let price = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| AppError::Validation(BAD_PRICE.to_string()))?;

    if price <= Decimal::ZERO {
        return Err(AppError::Validation(BAD_PRICE.to_string()));
    }

    let price = price.normalize();
    if price.scale() > PRICE_MAX_SCALE || price >= Decimal::from(PRICE_LIMIT) {
        return Err(AppError::Validation(PRICE_OUT_OF_RANGE.to_string()));
    }
    Ok(price)
}

pub fn parse_product_id(raw: Option<String>) -> AppResult<Uuid> {
    let raw = raw
        .and_then(non_blank)
        .ok_or_else(|| AppError::Validation("Please provide productId".to_string()))?;
    Uuid::parse_str(&raw).map_err(|_| AppError::Validation("Invalid productId".to_string()))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
