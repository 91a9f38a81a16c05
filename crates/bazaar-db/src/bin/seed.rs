//! # Seed Data Generator
//!
//! Populates the database with sample products and customers for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p bazaar-db --bin seed
//!
//! # Specify database path
//! cargo run -p bazaar-db --bin seed -- --db ./data/bazaar.db
//! ```

use chrono::Utc;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bazaar_core::{Customer, Product};
use bazaar_db::repository::customer::generate_customer_id;
use bazaar_db::repository::product::generate_product_id;
use bazaar_db::{Database, DbConfig};

/// (name, description, price in cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("Walnut Desk Organizer", "Five-compartment organizer in oiled walnut", 2499),
    ("Ceramic Pour-Over Set", "Dripper and carafe, matte white glaze", 3800),
    ("Linen Throw Blanket", "Stonewashed linen, 130x170cm", 5250),
    ("Brass Page Holder", "Weighted page spreader for reading stands", 1200),
    ("Field Notebook 3-Pack", "Dot grid, 48 pages each", 999),
    ("Enamel Camp Mug", "12oz, speckled navy", 1450),
    ("Beeswax Food Wraps", "Set of three sizes", 1825),
    ("Cork Desk Mat", "80x30cm, natural cork", 2150),
];

/// (name, email)
const CUSTOMERS: &[(&str, &str)] = &[
    ("Ada Fisher", "ada.fisher@example.com"),
    ("Noor Haddad", "noor.haddad@example.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db_path = parse_db_path().unwrap_or_else(|| "./bazaar.db".to_string());

    info!(path = %db_path, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let products = db.products();
    let now = Utc::now();
    for (name, description, price_cents) in PRODUCTS {
        products
            .insert(&Product {
                id: generate_product_id(),
                name: name.to_string(),
                description: Some(description.to_string()),
                price_cents: *price_cents,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    let customers = db.customers();
    for (name, email) in CUSTOMERS {
        customers
            .insert(&Customer {
                id: generate_customer_id(),
                name: name.to_string(),
                email: email.to_string(),
                phone_number: None,
                address: None,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    info!(
        products = PRODUCTS.len(),
        customers = CUSTOMERS.len(),
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// Reads `--db <path>` from the command line.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
