use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartList, CartSummary},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{CartEntry, CartLine, Product},
    response::ApiResponse,
    routes::{cart, health, products},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::cart_summary,
    ),
    components(
        schemas(
            Product,
            CartEntry,
            CartLine,
            CreateProductRequest,
            UpdateProductRequest,
            AddToCartRequest,
            ProductList,
            CartList,
            CartSummary,
            health::HealthData,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartLine>,
            ApiResponse<CartList>,
            ApiResponse<CartSummary>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Cart", description = "Shopping cart endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
