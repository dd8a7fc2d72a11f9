//! # Seed Data Generator
//!
//! Populates the database with sample inventory and purchase orders for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p vela-db --bin seed
//!
//! # Custom product count / database path
//! cargo run -p vela-db --bin seed -- --count 50 --db ./data/vela.db
//! ```
//!
//! ## What Gets Seeded
//! - Opening-stock IN movements for generated products
//! - A handful of ADJUST corrections so balances look lived-in
//! - One purchase order left ORDERED, one SHIPPED, one fully RECEIVED
//!   (the received one posts real stock through the ledger)
//! - A block of internal barcodes from the sequence allocator

use std::env;

use vela_core::{
    AdjustMode, MovementInput, MovementType, PurchaseCurrency, PurchaseItemInput,
    PurchaseOrderInput, PurchaseStatus, StatusUpdate, StoreContext,
};
use vela_db::{Database, DbConfig};

const STORE_ID: &str = "store-dev";
const USER_ID: &str = "user-seed";

/// Product name pool for realistic test data
const PRODUCTS: &[&str] = &[
    "Sticky Rice 1kg",
    "Jasmine Rice 5kg",
    "Fish Sauce 700ml",
    "Oyster Sauce 510g",
    "Instant Noodles Pork",
    "Instant Noodles Tom Yum",
    "Drinking Water 600ml",
    "Soda Water 325ml",
    "Green Tea 500ml",
    "Iced Coffee Can",
    "Condensed Milk 380g",
    "Palm Sugar 500g",
    "Dried Chili 100g",
    "Garlic 250g",
    "Cooking Oil 1L",
    "Soy Sauce 300ml",
    "Rice Crackers",
    "Banana Chips",
    "Roasted Peanuts 200g",
    "Coconut Milk 400ml",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 20;
    let mut db_path = String::from("./vela_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vela POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to stock (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./vela_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vela POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let ctx = StoreContext::new(STORE_ID, USER_ID);

    // Check for an existing seed
    let existing = db.stock().list_low_stock(STORE_ID, i64::MAX).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has stock for {}", STORE_ID);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Opening stock
    println!();
    println!("Posting opening stock...");

    let start = std::time::Instant::now();
    let mut posted = 0;

    for seed in 0..count {
        let product_id = product_id(seed);
        let qty = 10 + ((seed * 13) % 90) as i64;

        db.stock()
            .apply_movement(
                &ctx,
                MovementInput {
                    product_id: product_id.clone(),
                    unit_id: "base".into(),
                    movement_type: MovementType::In,
                    qty,
                    adjust_mode: None,
                    note: Some("Opening stock".into()),
                },
            )
            .await?;
        posted += 1;

        // A correction here and there
        if seed % 7 == 3 {
            db.stock()
                .apply_movement(
                    &ctx,
                    MovementInput {
                        product_id,
                        unit_id: "base".into(),
                        movement_type: MovementType::Adjust,
                        qty: 2,
                        adjust_mode: Some(AdjustMode::Decrease),
                        note: Some("Stocktake correction".into()),
                    },
                )
                .await?;
            posted += 1;
        }
    }

    println!("✓ Posted {} movements in {:?}", posted, start.elapsed());

    // Purchase orders in each live state
    println!();
    println!("Creating purchase orders...");

    let ordered = db
        .purchases()
        .create(&ctx, order_input(0, "Vientiane Wholesale", false))
        .await?;
    println!("  ORDERED  {}", ordered.order.id);

    let shipped = db
        .purchases()
        .create(&ctx, order_input(3, "Mekong Trading", false))
        .await?;
    db.purchases()
        .update_status(
            &ctx,
            &shipped.order.id,
            StatusUpdate {
                status: PurchaseStatus::Shipped,
                tracking_info: Some("TH-2024-88341".into()),
                received_items: None,
            },
        )
        .await?;
    println!("  SHIPPED  {}", shipped.order.id);

    let received = db
        .purchases()
        .create(&ctx, order_input(6, "Lao Import Co", true))
        .await?;
    println!("  RECEIVED {}", received.order.id);

    // Barcodes
    println!();
    println!("Allocating internal barcodes...");
    for _ in 0..5 {
        let code = db.sequences().next_barcode(STORE_ID).await?;
        println!("  {}", code);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn product_id(seed: usize) -> String {
    let name = PRODUCTS[seed % PRODUCTS.len()];
    format!(
        "prod-{}-{:03}",
        name.split(' ').next().unwrap_or("item").to_lowercase(),
        seed
    )
}

/// Builds a three-line purchase order starting at the given product offset.
fn order_input(offset: usize, supplier: &str, receive_immediately: bool) -> PurchaseOrderInput {
    let items = (offset..offset + 3)
        .map(|seed| PurchaseItemInput {
            product_id: product_id(seed),
            qty_ordered: 5 + ((seed * 11) % 40) as i64,
            unit_cost_purchase: 800 + ((seed * 321) % 9000) as i64,
        })
        .collect();

    PurchaseOrderInput {
        supplier_name: Some(supplier.to_string()),
        supplier_contact: Some("020 5555 0000".into()),
        purchase_currency: PurchaseCurrency::Thb,
        exchange_rate: 580.0,
        shipping_cost: 1500,
        other_cost: 0,
        other_cost_note: None,
        note: Some("Seed data".into()),
        expected_at: None,
        items,
        receive_immediately,
    }
}
