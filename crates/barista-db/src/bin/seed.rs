//! # Seed Data Writer
//!
//! Writes the default dataset into a database file.
//!
//! ## Usage
//! ```bash
//! # Seed ./barista_dev.db (only collections that are absent)
//! cargo run -p barista-db --bin seed
//!
//! # Specify database path
//! cargo run -p barista-db --bin seed -- --db ./data/barista.db
//!
//! # Discard stored collections and start over
//! cargo run -p barista-db --bin seed -- --force
//! ```

use std::env;

use barista_db::{load_inventory, Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = "./barista_dev.db".to_string();
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Barista POS Seed Data Writer");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./barista_dev.db)");
                println!("  -f, --force        Replace existing collections with the defaults");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    println!("🌱 Barista POS Seed Data Writer");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if force {
        let removed = db.collections().clear().await?;
        println!("✓ Removed {} stored collections", removed);
    }

    let loaded = load_inventory(&db).await?;
    if loaded.seeded.is_empty() {
        println!("⚠ Every collection already exists, nothing seeded.");
        println!("  Pass --force to replace them with the defaults.");
    } else {
        for name in &loaded.seeded {
            println!("✓ Seeded {}", name);
        }
    }

    let inventory = &loaded.inventory;
    println!();
    println!("  Products:      {}", inventory.catalog().len());
    println!("  Raw materials: {}", inventory.materials().len());
    println!("  Purchases:     {}", inventory.purchases().len());
    println!("  Transactions:  {}", inventory.transactions().len());
    println!(
        "  Stock value:   {}",
        inventory.materials().inventory_value().round_to_cents()
    );

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
