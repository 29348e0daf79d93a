//! # Seed Data Generator
//!
//! Populates a database with suppliers, storages, products, stock and
//! expiration batches for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stockroom-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! Log level follows `RUST_LOG`; pool settings follow the `STOCKROOM_DB_*`
//! variables, with `--db` overriding the path.

use std::env;

use chrono::{Days, Utc};
use stockroom_core::query::{ListQuery, RawParameterMap};
use stockroom_core::{Product, Storage, Supplier, Validity};
use stockroom_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_COUNT: usize = 200;

const SUPPLIERS: &[(&str, &str)] = &[
    ("Northwind Traders", "orders@northwind.example"),
    ("Contoso Hardware", "sales@contoso.example"),
    ("Fabrikam Foods", "supply@fabrikam.example"),
];

const STORAGES: &[(&str, &str)] = &[
    ("Front Store", "1 Market Street"),
    ("Back Room", "1 Market Street"),
    ("Warehouse", "48 Dock Road"),
];

/// Product names with a short description; sizes multiply them out.
const CATALOG: &[(&str, &str)] = &[
    ("Cola", "carbonated soft drink"),
    ("Orange Juice", "chilled, not from concentrate"),
    ("Whole Milk", "pasteurised dairy"),
    ("Greek Yogurt", "strained, cultured"),
    ("Sandpaper", "abrasive sheet, coated"),
    ("Wood Glue", "fast setting adhesive"),
    ("Claw Hammer", "forged steel head"),
    ("Masking Tape", "low tack, painted surfaces"),
    ("Rice", "long grain white"),
    ("Pasta", "durum wheat, dried"),
];

const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 80),
    ("Large", 190),
    ("Bulk", 600),
];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!(
                    "  -c, --count <N>    Number of products to generate (default: {DEFAULT_COUNT})"
                );
                println!("  -d, --db <PATH>    Database file path (default: $STOCKROOM_DB_PATH)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = DbConfig::from_env()?;
    if let Some(path) = db_path {
        config.database_path = path.into();
    }

    info!(path = %config.database_path.display(), count, "Seeding database");

    let db = Database::new(config).await?;
    let ctx = db.context();

    let existing = db.products().count(&ctx, &RawParameterMap::new()).await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    let mut supplier_ids = Vec::with_capacity(SUPPLIERS.len());
    for (name, email) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .insert(&ctx, &Supplier::draft(*name).with_email(*email))
            .await?;
        supplier_ids.push(supplier.id);
    }

    let mut storage_ids = Vec::with_capacity(STORAGES.len());
    for (name, address) in STORAGES {
        let storage = db
            .storages()
            .insert(&ctx, &Storage::draft(*name, Some(address.to_string())))
            .await?;
        storage_ids.push(storage.id);
    }

    let start = std::time::Instant::now();
    let today = Utc::now().date_naive();
    let mut generated = 0;

    for seed in 0..count {
        let (name, description) = CATALOG[seed % CATALOG.len()];
        let (size, price_addon) = SIZES[(seed / CATALOG.len()) % SIZES.len()];
        let round = seed / (CATALOG.len() * SIZES.len());

        let lowest = 99 + ((seed * 37) % 900) as i64 + price_addon;
        let highest = lowest + ((seed * 13) % 200) as i64;

        let product_name = if round == 0 {
            format!("{name} {size}")
        } else {
            format!("{name} {size} #{round}")
        };

        let product = Product::draft(product_name, lowest, highest)
            .with_description(description)
            .with_supplier(supplier_ids[seed % supplier_ids.len()]);

        let product = match db.products().insert(&ctx, &product).await {
            Ok(product) => product,
            Err(err) => {
                warn!(error = %err, "Failed to insert product");
                continue;
            }
        };

        let storage = storage_ids[seed % storage_ids.len()];
        let quantity = (seed % 101) as i64;
        db.stocks()
            .set_quantity(&ctx, product.id, storage, quantity)
            .await?;

        if quantity > 0 {
            let expires = today
                .checked_add_days(Days::new((seed % 120) as u64))
                .unwrap_or(today);
            db.validities()
                .insert(&ctx, &Validity::draft(product.id, storage, expires, quantity))
                .await?;
        }

        generated += 1;
        if generated % 50 == 0 {
            info!(generated, "Seeding progress");
        }
    }

    let elapsed = start.elapsed();
    info!(
        generated,
        elapsed_ms = elapsed.as_millis() as u64,
        "Products generated"
    );

    // Exercise the filter compiler against the fresh data.
    let query = ListQuery::from_pairs([
        ("description[]", "~sw~ab"),
        ("description[]", "~ew~coated"),
        ("lowest_price", "~gt~900"),
        ("opmodeor", "true"),
    ])?;
    let page = db.products().list(&ctx, &query).await?;
    info!(total = page.total, shown = page.items.len(), "Sample filtered listing");

    let week = today.checked_add_days(Days::new(7)).unwrap_or(today);
    let expiring = db
        .validities()
        .expiring_before(&ctx, week, Default::default())
        .await?;
    info!(total = expiring.total, "Batches expiring within a week");

    db.close().await;
    info!("Seed complete");
    Ok(())
}
