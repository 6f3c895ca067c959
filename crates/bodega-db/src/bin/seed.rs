//! # Seed Data Generator
//!
//! Populates the database with demo data for development: a sari-sari
//! store's shelf, a few suki customers with utang, a day of sales, and an
//! open wallet session.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p bodega-db --bin seed
//!
//! # Specify database path
//! cargo run -p bodega-db --bin seed -- --db ./data/bodega.db
//! ```

use std::env;

use bodega_core::{InventoryItem, LineItemDraft, Money};
use bodega_db::{Store, StoreConfig};
use chrono::Utc;
use tracing_subscriber::EnvFilter;

/// Shelf items: name, price (centavos), cost (centavos), stock.
const ITEMS: &[(&str, i64, i64, i64)] = &[
    ("Sardinas (155g)", 2500, 2100, 48),
    ("Corned Beef (150g)", 3800, 3300, 30),
    ("Pancit Canton (pack)", 1500, 1200, 120),
    ("Instant Noodles Beef", 1200, 950, 100),
    ("Suka (350ml)", 1800, 1400, 24),
    ("Toyo (350ml)", 2000, 1600, 24),
    ("Asin (1kg)", 1500, 1000, 40),
    ("Asukal (1kg)", 6500, 5800, 25),
    ("Bigas (1kg)", 5200, 4700, 80),
    ("Kape 3-in-1 (sachet)", 800, 600, 200),
    ("Gatas Evaporada", 3500, 3000, 36),
    ("Mantika (1L)", 9500, 8600, 15),
    ("Sabon Panlaba (bar)", 1800, 1400, 60),
    ("Shampoo (sachet)", 700, 500, 150),
    ("Toothpaste (sachet)", 900, 650, 90),
    ("Softdrinks (1L)", 7500, 6500, 20),
    ("Tubig (500ml)", 1500, 900, 60),
    ("Biskwit (pack)", 1000, 750, 80),
    ("Chicharon (pack)", 2000, 1500, 45),
    ("Posporo", 500, 300, 100),
];

/// Suki customers: name, starting utang (centavos).
const CUSTOMERS: &[(&str, i64)] = &[
    ("Aling Nena", 15000),
    ("Mang Tomas", 0),
    ("Ka Eddie", 8500),
    ("Tindera Luz", 0),
    ("Boy Balut", 4200),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./bodega_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bodega Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./bodega_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bodega Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = StoreConfig::new(&db_path);
    let store = Store::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing items
    let existing = store.inventory().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Shelf
    println!();
    println!("Stocking the shelf...");
    let mut items = Vec::new();
    for (name, price, cost, stock) in ITEMS {
        let item = store
            .inventory()
            .create(name, Money::from_cents(*price), Money::from_cents(*cost), *stock)
            .await?;
        items.push(item);
    }
    println!("  {} items on the shelf", items.len());

    // Customers
    println!();
    println!("Adding suki customers...");
    let mut customers = Vec::new();
    for (name, utang) in CUSTOMERS {
        let customer = store
            .customers()
            .add_customer(name, Money::from_cents(*utang), Some("carried over from the old notebook"))
            .await?;
        customers.push(customer);
    }
    println!("  {} customers in the ledger", customers.len());

    // A day of trade
    println!();
    println!("Recording a day of trade...");

    store
        .wallet()
        .start_day(Utc::now().date_naive(), Money::from_cents(50000))
        .await?;
    println!("  Wallet opened with ₱500.00");

    let sale = store
        .sales()
        .commit_sale(
            &[draft(&items, "Sardinas (155g)", 2), draft(&items, "Bigas (1kg)", 1)],
            None,
        )
        .await?;
    println!("  Sale {} for {}", sale.receipt_number, sale.total);

    let voided = store
        .sales()
        .commit_sale(&[draft(&items, "Kape 3-in-1 (sachet)", 3)], Some("Tindera Luz"))
        .await?;
    store.sales().void_sale(&voided.id).await?;
    println!("  Sale {} committed then voided (stock restored)", voided.receipt_number);

    let credit = store
        .ledger()
        .commit_credit(
            &customers[1].id,
            &[
                draft(&items, "Mantika (1L)", 1),
                draft(&items, "Pancit Canton (pack)", 2),
            ],
            Some("listahan ni Mang Tomas"),
        )
        .await?;
    println!("  Credit of {} for {}", credit.amount, customers[1].name);

    let payment = store
        .ledger()
        .commit_payment(&customers[0].id, Money::from_cents(5000), None)
        .await?;
    println!(
        "  Payment of {} from {} ({} applied)",
        payment.entry.amount, customers[0].name, payment.allocated
    );

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seeded in {:?}", elapsed);

    // Verify what the dashboard would read
    println!();
    println!("Today at the store:");
    let summary = store.sales().sales_summary(Utc::now().date_naive()).await?;
    println!("  Active sales: {} totalling {}", summary.count, summary.total);
    let expected = store.wallet().expected_cash(Utc::now().date_naive()).await?;
    println!("  Expected cash in drawer: {}", expected);

    println!();
    println!("Outstanding balances:");
    for customer in store.customers().list_active().await? {
        println!("  {:<12} {}", customer.name, customer.balance);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds a draft line for a named shelf item.
fn draft(items: &[InventoryItem], name: &str, quantity: i64) -> LineItemDraft {
    let item = items
        .iter()
        .find(|item| item.name == name)
        .unwrap_or_else(|| panic!("seed item missing: {name}"));

    LineItemDraft {
        item_id: Some(item.id.clone()),
        item_name: item.name.clone(),
        quantity,
        unit_price: item.price,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bodega=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
