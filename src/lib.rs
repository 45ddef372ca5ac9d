pub mod catalog;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use catalog::{Catalog, CatalogWriter, HttpImageFetcher, ImageFetcher, ImageSlot, RestCatalog};
pub use config::Settings;
pub use error::{Error, Result};
pub use models::{FeedRecord, ImportReport};
pub use services::{FeedSource, Importer, KevroFeedClient};
pub use storage::RunCache;
