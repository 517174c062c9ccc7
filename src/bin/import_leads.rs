//! Script to bulk-import a leads CSV file into the database.
//!
//! Usage: `import_leads <file.csv>` with DATABASE_URL set. Uses the same
//! parser and defaulting rules as the HTTP import endpoint, so a file that
//! imports here imports there too.

use dotenvy::dotenv;
use std::env;

use aghora_leads_api::db::Database;
use aghora_leads_api::import;
use aghora_leads_api::storage::LeadStorage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let path = env::args()
        .nth(1)
        .ok_or("Usage: import_leads <file.csv>")?;

    let data = tokio::fs::read(&path).await?;
    let leads = import::parse_csv(&data).map_err(|e| e.to_string())?;
    tracing::info!("Parsed {} leads from {}", leads.len(), path);

    if leads.is_empty() {
        tracing::warn!("Nothing to import, exiting");
        return Ok(());
    }

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::new(&database_url).await?;
    let storage = LeadStorage::new(db.pool.clone());

    let imported = storage
        .insert_many(&leads)
        .await
        .map_err(|e| e.to_string())?;

    tracing::info!("Import complete. Inserted {} leads.", imported);

    Ok(())
}
