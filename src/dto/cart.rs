use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartLine;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(alias = "product_id")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub product_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartList {
    #[schema(value_type = Vec<CartLine>)]
    pub items: Vec<CartLine>,
}

/// Outcome of an add: a brand new line or an existing one bumped by one.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAddition {
    Created(CartLine),
    Incremented(CartLine),
}

impl CartAddition {
    pub fn line(&self) -> &CartLine {
        match self {
            CartAddition::Created(line) | CartAddition::Incremented(line) => line,
        }
    }

    pub fn into_line(self) -> CartLine {
        match self {
            CartAddition::Created(line) | CartAddition::Incremented(line) => line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartSummary {
    /// Sum of quantities, including lines whose product was deleted.
    pub count: i64,
    /// Sum of price × quantity over resolved lines, two decimal places.
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 25.0)]
    pub total: Decimal,
}
