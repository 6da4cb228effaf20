use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::Product;

/// Raw create payload. Every field is optional here so that a missing one
/// is reported as a validation error rather than a JSON rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    /// A JSON number or a numeric string.
    #[schema(value_type = Option<f64>, example = 19.99)]
    pub price: Option<Value>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<f64>, example = 24.5)]
    pub price: Option<Value>,
    pub image: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
