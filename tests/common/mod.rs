use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use kevro_import::catalog::{
    Catalog, EntryDraft, EntryId, ImageFetcher, MediaId, StockUpdate, TermId,
};
use kevro_import::error::{Error, Result};
use kevro_import::models::FeedRecord;
use kevro_import::services::FeedSource;

pub fn record(stock_id: i64, category: &str, base_price: Decimal) -> FeedRecord {
    FeedRecord {
        stock_code: format!("SC-{stock_id}"),
        stock_header_id: 1,
        stock_id,
        description: format!("Item {stock_id}"),
        colour: "Black".to_string(),
        size: "M".to_string(),
        color_status: "Regular".to_string(),
        base_price,
        discount_base_price: base_price,
        royalty_factor: dec!(1),
        category: category.to_string(),
        product_type: "Tops".to_string(),
        brand: "Barron".to_string(),
        image_url: format!("https://images.example.com/{stock_id}/main.png"),
        qty_available: 5,
        import_run_id: None,
        warehouse_quantities: HashMap::new(),
    }
}

/// In-memory feed that counts how often it is actually called.
pub struct StubFeed {
    records: Vec<FeedRecord>,
    pub fetch_calls: AtomicUsize,
    pub fail: bool,
}

impl StubFeed {
    pub fn new(records: Vec<FeedRecord>) -> Self {
        Self {
            records,
            fetch_calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fetch_calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for StubFeed {
    async fn fetch_feed(&self, run_id: &str) -> Result<Vec<FeedRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Remote("feed offline".to_string()));
        }
        let mut records = self.records.clone();
        for record in &mut records {
            record.import_run_id = Some(run_id.to_string());
        }
        Ok(records)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryEntry {
    pub title: String,
    pub sku: String,
    pub visible: bool,
    pub stock_quantity: Option<i64>,
    pub in_stock: Option<bool>,
    pub regular_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub category: Option<TermId>,
    pub featured_image: Option<MediaId>,
    /// Comma-joined media ids, mirroring the gallery meta field.
    pub gallery: String,
}

/// In-memory stand-in for the destination catalog.
pub struct MemoryCatalog {
    next_id: AtomicI64,
    pub entries: Mutex<HashMap<EntryId, MemoryEntry>>,
    pub terms: Mutex<HashMap<String, TermId>>,
    pub media_names: Mutex<Vec<String>>,
    pub fail_create_skus: Mutex<HashSet<String>>,
}

impl MemoryCatalog {
    pub fn new(terms: &[(&str, TermId)]) -> Self {
        Self {
            next_id: AtomicI64::new(1),
            entries: Mutex::new(HashMap::new()),
            terms: Mutex::new(
                terms
                    .iter()
                    .map(|(name, id)| (name.to_string(), *id))
                    .collect(),
            ),
            media_names: Mutex::new(Vec::new()),
            fail_create_skus: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_create_for(&self, sku: &str) {
        self.fail_create_skus
            .lock()
            .unwrap()
            .insert(sku.to_string());
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn entry_by_sku(&self, sku: &str) -> Option<MemoryEntry> {
        self.entries
            .lock()
            .unwrap()
            .values()
            .find(|e| e.sku == sku)
            .cloned()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn create_entry(&self, draft: &EntryDraft) -> Result<EntryId> {
        if self.fail_create_skus.lock().unwrap().contains(&draft.sku) {
            return Err(Error::Write(format!("rejected sku {}", draft.sku)));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().insert(
            id,
            MemoryEntry {
                title: draft.title.clone(),
                sku: draft.sku.clone(),
                ..Default::default()
            },
        );
        Ok(id)
    }

    async fn set_visibility(&self, entry: EntryId, visible: bool) -> Result<()> {
        self.with_entry(entry, |e| e.visible = visible)
    }

    async fn set_stock(&self, entry: EntryId, stock: StockUpdate) -> Result<()> {
        self.with_entry(entry, |e| {
            e.stock_quantity = Some(stock.quantity);
            e.in_stock = Some(stock.in_stock);
        })
    }

    async fn set_prices(&self, entry: EntryId, regular: Decimal, sale: Decimal) -> Result<()> {
        self.with_entry(entry, |e| {
            e.regular_price = Some(regular);
            e.sale_price = Some(sale);
        })
    }

    async fn find_category_term(&self, name: &str) -> Result<Option<TermId>> {
        Ok(self.terms.lock().unwrap().get(name).copied())
    }

    async fn assign_category(&self, entry: EntryId, term: TermId) -> Result<()> {
        self.with_entry(entry, |e| e.category = Some(term))
    }

    async fn create_media(&self, file_name: &str, _bytes: Vec<u8>) -> Result<MediaId> {
        let mut names = self.media_names.lock().unwrap();
        // Collision-safe naming, the way an uploads directory would.
        let unique = if names.iter().any(|n| n == file_name) {
            let mut counter = 1;
            loop {
                let candidate = format!("{counter}-{file_name}");
                if !names.iter().any(|n| n == &candidate) {
                    break candidate;
                }
                counter += 1;
            }
        } else {
            file_name.to_string()
        };
        names.push(unique);
        Ok(names.len() as MediaId)
    }

    async fn set_featured_image(&self, entry: EntryId, media: MediaId) -> Result<()> {
        self.with_entry(entry, |e| e.featured_image = Some(media))
    }

    async fn append_gallery_image(&self, entry: EntryId, media: MediaId) -> Result<()> {
        self.with_entry(entry, |e| {
            if e.gallery.is_empty() {
                e.gallery = media.to_string();
            } else {
                e.gallery = format!("{},{media}", e.gallery);
            }
        })
    }
}

impl MemoryCatalog {
    fn with_entry(&self, entry: EntryId, f: impl FnOnce(&mut MemoryEntry)) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(&entry) {
            Some(e) => {
                f(e);
                Ok(())
            }
            None => Err(Error::Write(format!("no entry {entry}"))),
        }
    }
}

/// Image fetcher that serves fixed bytes, or refuses everything.
pub struct StubImages {
    pub fail: bool,
}

#[async_trait]
impl ImageFetcher for StubImages {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if self.fail {
            return Err(Error::Remote(format!("image host unreachable: {url}")));
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}
