//! # Barista POS Entry Point
//!
//! Opens (or creates) the store database and prints the state of the shop:
//! catalog size, stock value, and everything running low.
//!
//! ```bash
//! BARISTA_DB_PATH=./barista_dev.db cargo run -p barista-pos
//! ```

use barista_pos::commands::{catalog, inventory};
use barista_pos::state::ConfigState;
use barista_pos::{init_tracing, open_shop};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting Barista POS");

    let config = ConfigState::from_env();
    let (shop, db) = open_shop(&config).await?;

    let summary = inventory::inventory_summary(&shop, &config).await;
    println!("☕ {}", config.store_name);
    println!("   Products:      {}", summary.product_count);
    println!("   Raw materials: {}", summary.material_count);
    println!(
        "   Stock value:   {}",
        config.format_currency(summary.stock_value)
    );

    for product in catalog::low_stock_products(&shop, &config).await {
        warn!(id = %product.id, name = %product.name, stock = product.stock, "Product low on stock");
        println!("⚠ {} has {} left", product.name, product.stock);
    }
    for material in inventory::low_stock_materials(&shop, &config).await {
        warn!(id = %material.id, name = %material.name, stock = %material.stock, "Raw material low on stock");
        println!("⚠ {} has {} {} left", material.name, material.stock, material.unit);
    }

    db.close().await;
    Ok(())
}
