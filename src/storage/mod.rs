pub mod cache;

pub use cache::RunCache;
