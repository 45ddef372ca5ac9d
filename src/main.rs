use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kevro_import::catalog::{CatalogWriter, HttpImageFetcher, ImageSlot, RestCatalog};
use kevro_import::config::Settings;
use kevro_import::services::{Importer, KevroFeedClient};
use kevro_import::storage::RunCache;

/// Import the Kevro product feed into the commerce catalog.
#[derive(Parser, Debug)]
struct Args {
    /// Unique import id. Re-running with the same id resumes the run
    /// from its cached snapshot and ledger instead of re-fetching.
    run_id: String,

    /// Attach product images to the gallery instead of as the
    /// featured image.
    #[arg(long)]
    gallery_images: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let settings = Settings::new()?;

    let feed = Arc::new(KevroFeedClient::new(settings.feed.clone())?);
    let catalog = Arc::new(RestCatalog::new(settings.catalog.clone())?);
    let images = Arc::new(HttpImageFetcher::new()?);
    let writer = CatalogWriter::new(catalog, images);
    let cache = RunCache::new(&settings.import.cache_dir);

    let slot = if args.gallery_images {
        ImageSlot::Gallery
    } else {
        ImageSlot::Featured
    };

    let importer = Importer::new(feed, writer, cache, settings.import.max_writes_per_run)
        .with_image_slot(slot);

    let report = importer.run(&args.run_id).await?;

    println!("\nImport Summary:");
    println!("Run ID: {}", report.run_id);
    println!(
        "Snapshot: {}",
        if report.snapshot_fetched {
            "fetched from feed"
        } else {
            "loaded from cache"
        }
    );
    println!("Total Records: {}", report.total_records);
    println!("Written: {}", report.written);
    println!("Ineligible: {}", report.ineligible);
    println!("Already Imported: {}", report.already_imported);
    println!("Capped: {}", report.capped);
    println!("Failed: {}", report.failed);
    println!(
        "Duration: {:.1}s",
        (report.completed_at - report.started_at).num_milliseconds() as f64 / 1000.0
    );

    for record in &report.records {
        if let kevro_import::models::RecordOutcome::Failed { stock_id, error } = record {
            eprintln!("  failed stock_id {stock_id}: {error}");
        }
    }

    Ok(())
}
