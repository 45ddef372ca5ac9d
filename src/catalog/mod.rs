pub mod media;
pub mod rest;
pub mod writer;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;

pub use media::{HttpImageFetcher, ImageFetcher};
pub use rest::RestCatalog;
pub use writer::CatalogWriter;

pub type EntryId = i64;
pub type TermId = i64;
pub type MediaId = i64;

/// Initial fields of a catalog entry, created in one call.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub sku: String,
}

/// Stock fields set on an entry after creation.
#[derive(Debug, Clone, Copy)]
pub struct StockUpdate {
    pub quantity: i64,
    pub in_stock: bool,
}

/// Where an attached image lands on the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Featured,
    Gallery,
}

/// The destination catalog system. The importer holds entry ids only
/// transiently during a single write; the catalog owns the entries.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Create a published simple-product entry.
    async fn create_entry(&self, draft: &EntryDraft) -> Result<EntryId>;

    /// Mark the entry visible in the storefront.
    async fn set_visibility(&self, entry: EntryId, visible: bool) -> Result<()>;

    /// Enable inventory tracking and set quantity and stock status.
    async fn set_stock(&self, entry: EntryId, stock: StockUpdate) -> Result<()>;

    /// Set the regular (pre-markup) and final sale prices.
    async fn set_prices(&self, entry: EntryId, regular: Decimal, sale: Decimal) -> Result<()>;

    /// Resolve a taxonomy term by its exact name.
    async fn find_category_term(&self, name: &str) -> Result<Option<TermId>>;

    /// Assign a resolved taxonomy term to the entry.
    async fn assign_category(&self, entry: EntryId, term: TermId) -> Result<()>;

    /// Store image bytes as a media asset. `file_name` is a hint; the
    /// catalog de-duplicates colliding names.
    async fn create_media(&self, file_name: &str, bytes: Vec<u8>) -> Result<MediaId>;

    /// Set the entry's featured image.
    async fn set_featured_image(&self, entry: EntryId, media: MediaId) -> Result<()>;

    /// Append the media reference to the entry's gallery.
    async fn append_gallery_image(&self, entry: EntryId, media: MediaId) -> Result<()>;
}
