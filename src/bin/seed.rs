use anyhow::Context;
use catalog_cart_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    models::NewProduct,
    state::AppState,
};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required to seed the catalog")?;

    let pool = create_pool(database_url, config.max_connections).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let state = AppState::postgres(pool);
    let seeded = seed_products(&state).await?;
    println!("Seed completed, {seeded} products inserted");
    Ok(())
}

async fn seed_products(state: &AppState) -> anyhow::Result<usize> {
    if !state.catalog.list().await?.is_empty() {
        println!("Catalog already has products, skipping");
        return Ok(0);
    }

    let products = [
        ("Axum Hoodie", Decimal::new(5500, 2), "https://picsum.photos/seed/hoodie/400"),
        ("Ferris Mug", Decimal::new(1200, 2), "https://picsum.photos/seed/mug/400"),
        ("Rust Sticker Pack", Decimal::new(499, 2), "https://picsum.photos/seed/stickers/400"),
        ("E-book: Async Rust", Decimal::new(2500, 2), "https://picsum.photos/seed/ebook/400"),
    ];

    for (name, price, image) in &products {
        state
            .catalog
            .insert(NewProduct {
                name: name.to_string(),
                price: *price,
                image: image.to_string(),
            })
            .await?;
        println!("Seeded {name}");
    }

    Ok(products.len())
}
