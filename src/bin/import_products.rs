//! Bulk product importer.
//!
//! Reads a product CSV (the export format of the store's previous system) and
//! loads it into the database. Categories are created on first sight by name;
//! products are always inserted, even when a barcode already exists, so a
//! re-run of the same file duplicates rows. Run it against a fresh database.

use clap::Parser;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use stockroom_api as api;

use api::entities::{category, product, Category};

#[derive(Parser, Debug)]
#[command(
    name = "import-products",
    about = "Load products from a CSV export into the stockroom database"
)]
struct Args {
    /// Path to the CSV file to import
    #[arg(short, long)]
    file: PathBuf,

    /// Database URL; falls back to the configured one when omitted
    #[arg(long)]
    database_url: Option<String>,

    /// Run migrations before importing
    #[arg(long, default_value_t = false)]
    migrate: bool,
}

/// Row layout of the export. The category column is capitalized in the
/// source files; everything else is snake_case.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Category")]
    category: String,
    name: String,
    brand: String,
    #[serde(default)]
    item_number: String,
    price: Decimal,
    barcode: String,
    #[serde(default)]
    quantity_in_stock: i32,
    #[serde(default)]
    unit_size: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    discount: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let args = Args::parse();
    if let Some(url) = args.database_url {
        cfg.database_url = url;
    }

    let db = Arc::new(api::db::establish_connection(&cfg).await?);
    if args.migrate {
        api::db::run_migrations(&db).await?;
    }

    let mut reader = csv::Reader::from_path(&args.file)?;

    // Categories repeat heavily in export files; resolve each name once.
    let mut category_ids: HashMap<String, Uuid> = HashMap::new();
    let mut imported = 0usize;
    let mut skipped = 0usize;

    for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                warn!(line = line + 2, error = %e, "Skipping unparseable row");
                skipped += 1;
                continue;
            }
        };

        let category_id = match category_ids.get(&row.category) {
            Some(id) => *id,
            None => {
                let id = resolve_category(&db, &row.category).await?;
                category_ids.insert(row.category.clone(), id);
                id
            }
        };

        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(row.name),
            brand: Set(row.brand),
            item_number: Set(row.item_number),
            price: Set(row.price),
            barcode: Set(row.barcode),
            quantity_in_stock: Set(row.quantity_in_stock),
            category_id: Set(category_id),
            unit_size: Set(row.unit_size),
            description: Set(row.description),
            discount: Set(row.discount),
        }
        .insert(&*db)
        .await?;
        imported += 1;
    }

    info!(
        imported,
        skipped,
        categories = category_ids.len(),
        "Import finished"
    );
    Ok(())
}

/// Finds a category by exact name, creating it when absent.
async fn resolve_category(
    db: &sea_orm::DatabaseConnection,
    name: &str,
) -> Result<Uuid, sea_orm::DbErr> {
    if let Some(existing) = Category::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing.id);
    }

    let created = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
    }
    .insert(db)
    .await?;
    info!(category = name, "Created category");
    Ok(created.id)
}
