use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::catalog::media::{file_name_from_url, ImageFetcher};
use crate::catalog::{Catalog, EntryDraft, EntryId, ImageSlot, StockUpdate};
use crate::error::Result;
use crate::models::record::FeedRecord;
use crate::models::report::{CategoryOutcome, FieldWrite};

/// Everything `CatalogWriter::write` did to one entry. Creation either
/// succeeds or fails the whole record; every later step is best-effort
/// and individually reported.
#[derive(Debug)]
pub struct EntryWriteReport {
    pub entry_id: EntryId,
    pub category: CategoryOutcome,
    pub fields: Vec<FieldWrite>,
}

/// Writes one feed record into the destination catalog as a sequence of
/// non-transactional steps: create the entry, then set visibility,
/// stock, prices, category, and image. A partially-written entry (for
/// example created but missing its image) is acceptable; each gap is
/// visible in the returned report.
pub struct CatalogWriter {
    catalog: Arc<dyn Catalog>,
    images: Arc<dyn ImageFetcher>,
}

impl CatalogWriter {
    pub fn new(catalog: Arc<dyn Catalog>, images: Arc<dyn ImageFetcher>) -> Self {
        Self { catalog, images }
    }

    /// Create the catalog entry for `record` and populate it. Fails
    /// only when the catalog rejects the creation itself.
    pub async fn write(
        &self,
        record: &FeedRecord,
        computed_price: Decimal,
        image_slot: ImageSlot,
    ) -> Result<EntryWriteReport> {
        let draft = EntryDraft {
            title: record.description.clone(),
            content: record.description.clone(),
            excerpt: record.description.clone(),
            sku: record.stock_id.to_string(),
        };

        let entry_id = self.catalog.create_entry(&draft).await?;
        let mut fields = vec![FieldWrite::ok("entry")];

        self.step(&mut fields, "visibility", || {
            self.catalog.set_visibility(entry_id, true)
        })
        .await;

        let stock = StockUpdate {
            quantity: record.qty_available,
            in_stock: record.qty_available > 0,
        };
        self.step(&mut fields, "stock", || self.catalog.set_stock(entry_id, stock))
            .await;

        self.step(&mut fields, "prices", || {
            self.catalog
                .set_prices(entry_id, record.base_price, computed_price)
        })
        .await;

        let category = self.assign_category(entry_id, record, &mut fields).await;
        self.attach_image(entry_id, record, image_slot, &mut fields)
            .await;

        info!(
            stock_id = record.stock_id,
            entry_id,
            price = %computed_price,
            "Catalog entry written"
        );

        Ok(EntryWriteReport {
            entry_id,
            category,
            fields,
        })
    }

    async fn step<F, Fut>(&self, fields: &mut Vec<FieldWrite>, name: &str, op: F)
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<()>>,
    {
        match op().await {
            Ok(()) => fields.push(FieldWrite::ok(name)),
            Err(e) => {
                warn!(field = name, error = %e, "Entry field write failed");
                fields.push(FieldWrite::failed(name, e.to_string()));
            }
        }
    }

    async fn assign_category(
        &self,
        entry_id: EntryId,
        record: &FeedRecord,
        fields: &mut Vec<FieldWrite>,
    ) -> CategoryOutcome {
        match self.catalog.find_category_term(&record.category).await {
            Ok(Some(term_id)) => match self.catalog.assign_category(entry_id, term_id).await {
                Ok(()) => {
                    fields.push(FieldWrite::ok("category"));
                    CategoryOutcome::Assigned { term_id }
                }
                Err(e) => {
                    warn!(entry_id, error = %e, "Category assignment failed");
                    fields.push(FieldWrite::failed("category", e.to_string()));
                    CategoryOutcome::Uncategorized
                }
            },
            Ok(None) => {
                // No matching taxonomy term: the entry stays
                // uncategorized, which is an outcome, not an error.
                warn!(
                    entry_id,
                    category = %record.category,
                    "No matching category term, entry left uncategorized"
                );
                fields.push(FieldWrite::failed(
                    "category",
                    format!("no term named {:?}", record.category),
                ));
                CategoryOutcome::Uncategorized
            }
            Err(e) => {
                warn!(entry_id, error = %e, "Category lookup failed");
                fields.push(FieldWrite::failed("category", e.to_string()));
                CategoryOutcome::Uncategorized
            }
        }
    }

    /// Fetch the record's image and attach it. A fetch or attach
    /// failure aborts only this step; the rest of the entry stands.
    async fn attach_image(
        &self,
        entry_id: EntryId,
        record: &FeedRecord,
        slot: ImageSlot,
        fields: &mut Vec<FieldWrite>,
    ) {
        let result = async {
            let bytes = self.images.fetch(&record.image_url).await?;
            let file_name = file_name_from_url(&record.image_url);
            let media_id = self.catalog.create_media(&file_name, bytes).await?;
            match slot {
                ImageSlot::Featured => self.catalog.set_featured_image(entry_id, media_id).await,
                ImageSlot::Gallery => self.catalog.append_gallery_image(entry_id, media_id).await,
            }
        }
        .await;

        match result {
            Ok(()) => fields.push(FieldWrite::ok("image")),
            Err(e) => {
                warn!(entry_id, url = %record.image_url, error = %e, "Image attachment failed");
                fields.push(FieldWrite::failed("image", e.to_string()));
            }
        }
    }
}
