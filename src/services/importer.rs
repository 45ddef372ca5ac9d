use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::catalog::writer::CatalogWriter;
use crate::catalog::ImageSlot;
use crate::error::{Error, Result};
use crate::models::record::FeedRecord;
use crate::models::report::{ImportReport, RecordOutcome};
use crate::services::feed::FeedSource;
use crate::services::pricing;
use crate::storage::RunCache;

/// Coordinates one import run: load-or-fetch the feed snapshot, load
/// the imported ledger, then walk the records in snapshot order
/// through filter, pricing, catalog write, and ledger update.
///
/// Collaborators are injected explicitly; there is no ambient global
/// state. Runs are sequential and single-writer per run id.
pub struct Importer {
    feed: Arc<dyn FeedSource>,
    writer: CatalogWriter,
    cache: RunCache,
    max_writes_per_run: usize,
    image_slot: ImageSlot,
}

impl Importer {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        writer: CatalogWriter,
        cache: RunCache,
        max_writes_per_run: usize,
    ) -> Self {
        Self {
            feed,
            writer,
            cache,
            max_writes_per_run,
            image_slot: ImageSlot::Featured,
        }
    }

    pub fn with_image_slot(mut self, slot: ImageSlot) -> Self {
        self.image_slot = slot;
        self
    }

    /// Execute the run for `run_id`. A feed-fetch failure aborts the
    /// whole run before any catalog writes; a single record's write
    /// failure does not.
    pub async fn run(&self, run_id: &str) -> Result<ImportReport> {
        let mut report = ImportReport::new(run_id);

        let records = self.load_or_fetch_snapshot(run_id, &mut report).await?;
        report.total_records = records.len();

        let mut ledger = self.cache.load_ledger(run_id).await.unwrap_or_else(|e| {
            warn!(run_id, error = %e, "Ledger unreadable, starting from an empty one");
            Default::default()
        });

        info!(
            run_id,
            records = records.len(),
            already_imported = ledger.len(),
            cap = self.max_writes_per_run,
            "Writing records"
        );

        let mut writes = 0usize;
        for record in &records {
            if !record.is_eligible() {
                report.push(RecordOutcome::Ineligible {
                    stock_id: record.stock_id,
                    category: record.category.clone(),
                });
                continue;
            }

            if ledger.contains(&record.stock_id) {
                report.push(RecordOutcome::AlreadyImported {
                    stock_id: record.stock_id,
                });
                continue;
            }

            if writes >= self.max_writes_per_run {
                report.push(RecordOutcome::CapReached {
                    stock_id: record.stock_id,
                });
                continue;
            }

            match self.write_record(run_id, record).await {
                Ok(outcome) => {
                    writes += 1;
                    // Grow the in-memory ledger too, so a stock id
                    // repeated within one snapshot is written once.
                    ledger.insert(record.stock_id);
                    report.push(outcome);
                }
                Err(e) => {
                    warn!(run_id, stock_id = record.stock_id, error = %e, "Record write failed");
                    report.push(RecordOutcome::Failed {
                        stock_id: record.stock_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.completed_at = Utc::now();
        info!(
            run_id,
            written = report.written,
            ineligible = report.ineligible,
            already_imported = report.already_imported,
            capped = report.capped,
            failed = report.failed,
            "Run complete"
        );
        Ok(report)
    }

    /// The Fetching phase: use the cached snapshot when one exists,
    /// otherwise fetch and persist it. An unreadable snapshot file is
    /// treated as a miss and forces a re-fetch.
    async fn load_or_fetch_snapshot(
        &self,
        run_id: &str,
        report: &mut ImportReport,
    ) -> Result<Vec<FeedRecord>> {
        match self.cache.load_snapshot(run_id).await {
            Ok(Some(records)) => {
                info!(run_id, records = records.len(), "Using cached feed snapshot");
                return Ok(records);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(run_id, error = %e, "Snapshot unreadable, re-fetching feed");
            }
        }

        let records = self.feed.fetch_feed(run_id).await?;
        report.snapshot_fetched = true;

        match self.cache.save_snapshot(run_id, &records).await {
            Ok(()) => {}
            Err(Error::SnapshotExists(_)) => {
                // Lost a race with an earlier partial save; the fetched
                // records are still the ones to process.
                warn!(run_id, "Snapshot appeared while fetching, keeping fetched records");
            }
            Err(e) => return Err(e),
        }

        Ok(records)
    }

    async fn write_record(&self, run_id: &str, record: &FeedRecord) -> Result<RecordOutcome> {
        let computed_price = pricing::final_price(record.base_price);

        let write = self
            .writer
            .write(record, computed_price, self.image_slot)
            .await?;

        // Ledger update is part of the record's success path: a record
        // is only skipped on later runs once it is durably recorded.
        self.cache.mark_imported(run_id, record.stock_id).await?;

        Ok(RecordOutcome::Written {
            stock_id: record.stock_id,
            entry_id: write.entry_id,
            computed_price,
            category: write.category,
            fields: write.fields,
        })
    }
}
