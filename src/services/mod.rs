pub mod feed;
pub mod importer;
pub mod pricing;
pub mod soap;

pub use feed::{FeedSource, KevroFeedClient};
pub use importer::Importer;
