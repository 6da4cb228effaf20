pub mod cart_service;
pub mod locks;
pub mod product_service;
