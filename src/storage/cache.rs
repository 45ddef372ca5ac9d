use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::FeedRecord;

/// Per-run on-disk cache: one snapshot file holding the raw feed and
/// one ledger file holding the stock ids already written to the
/// catalog. Both are keyed by run id and survive until manually
/// cleared, which is what makes interrupted runs resumable.
///
/// Single sequential writer is assumed; concurrent runs against the
/// same run id are unsupported.
pub struct RunCache {
    base_dir: PathBuf,
}

impl RunCache {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn snapshot_path(&self, run_id: &str) -> PathBuf {
        self.base_dir.join(format!("StockJSON-Parts-{run_id}.txt"))
    }

    pub fn ledger_path(&self, run_id: &str) -> PathBuf {
        self.base_dir
            .join(format!("StockJSON-Parts-Imported-{run_id}.txt"))
    }

    /// Load the cached feed snapshot for `run_id`, `None` when no
    /// snapshot has been persisted yet.
    pub async fn load_snapshot(&self, run_id: &str) -> Result<Option<Vec<FeedRecord>>> {
        let path = self.snapshot_path(run_id);
        match fs::read(&path).await {
            Ok(bytes) => {
                let records = serde_json::from_slice(&bytes)
                    .map_err(|e| cache_error(&path, &e.to_string()))?;
                Ok(Some(records))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(cache_error(&path, &e.to_string())),
        }
    }

    /// Persist the feed snapshot for `run_id`. The feed is immutable
    /// per run, so an existing snapshot is never overwritten.
    pub async fn save_snapshot(&self, run_id: &str, records: &[FeedRecord]) -> Result<()> {
        fs::create_dir_all(&self.base_dir).await?;

        let path = self.snapshot_path(run_id);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(Error::SnapshotExists(run_id.to_string()));
            }
            Err(e) => return Err(cache_error(&path, &e.to_string())),
        };

        let json = serde_json::to_vec(records)?;
        file.write_all(&json).await?;
        file.flush().await?;

        debug!(run_id, records = records.len(), path = %path.display(), "Snapshot persisted");
        Ok(())
    }

    /// Load the set of stock ids already imported for `run_id`; empty
    /// when no ledger file exists yet.
    pub async fn load_ledger(&self, run_id: &str) -> Result<BTreeSet<i64>> {
        let path = self.ledger_path(run_id);
        match fs::read(&path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| cache_error(&path, &e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeSet::new()),
            Err(e) => Err(cache_error(&path, &e.to_string())),
        }
    }

    /// Record `stock_id` as imported for `run_id`. Check-then-write
    /// over set semantics: returns `true` when the id was newly
    /// recorded, `false` when it was already in the ledger.
    pub async fn mark_imported(&self, run_id: &str, stock_id: i64) -> Result<bool> {
        let mut ledger = self.load_ledger(run_id).await?;
        if !ledger.insert(stock_id) {
            return Ok(false);
        }

        fs::create_dir_all(&self.base_dir).await?;
        let path = self.ledger_path(run_id);
        let json = serde_json::to_vec(&ledger)?;
        fs::write(&path, json)
            .await
            .map_err(|e| cache_error(&path, &e.to_string()))?;

        Ok(true)
    }
}

fn cache_error(path: &Path, message: &str) -> Error {
    Error::Cache(format!("{}: {message}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use rust_decimal_macros::dec;

    fn record(stock_id: i64) -> FeedRecord {
        FeedRecord {
            stock_code: "PA-CHI".to_string(),
            stock_header_id: 1,
            stock_id,
            description: format!("Record {stock_id}"),
            colour: "Black".to_string(),
            size: "28".to_string(),
            color_status: "Regular".to_string(),
            base_price: dec!(229.99),
            discount_base_price: dec!(204.69),
            royalty_factor: dec!(1),
            category: "Apparel".to_string(),
            product_type: "Bottoms".to_string(),
            brand: "Barron".to_string(),
            image_url: "https://example.com/images/1-Black.png".to_string(),
            qty_available: 64,
            import_run_id: Some("run-1".to_string()),
            warehouse_quantities: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RunCache::new(dir.path());

        assert!(cache.load_snapshot("run-1").await.unwrap().is_none());

        cache
            .save_snapshot("run-1", &[record(1), record(2)])
            .await
            .unwrap();

        let loaded = cache.load_snapshot("run-1").await.unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].stock_id, 1);
        assert_eq!(loaded[1].stock_id, 2);
    }

    #[tokio::test]
    async fn snapshot_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RunCache::new(dir.path());

        cache.save_snapshot("run-1", &[record(1)]).await.unwrap();
        let err = cache
            .save_snapshot("run-1", &[record(2)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SnapshotExists(_)));

        // Original snapshot intact.
        let loaded = cache.load_snapshot("run-1").await.unwrap().unwrap();
        assert_eq!(loaded[0].stock_id, 1);
    }

    #[tokio::test]
    async fn ledger_is_a_set() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RunCache::new(dir.path());

        assert!(cache.load_ledger("run-1").await.unwrap().is_empty());

        assert!(cache.mark_imported("run-1", 15004).await.unwrap());
        assert!(cache.mark_imported("run-1", 15005).await.unwrap());
        // Repeat marking is a no-op, not a duplicate entry.
        assert!(!cache.mark_imported("run-1", 15004).await.unwrap());

        let ledger = cache.load_ledger("run-1").await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains(&15004));
        assert!(ledger.contains(&15005));
    }

    #[tokio::test]
    async fn ledgers_are_scoped_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RunCache::new(dir.path());

        cache.mark_imported("run-1", 15004).await.unwrap();
        assert!(cache.load_ledger("run-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_snapshot_is_a_cache_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RunCache::new(dir.path());

        tokio::fs::write(cache.snapshot_path("run-1"), b"not json")
            .await
            .unwrap();

        let err = cache.load_snapshot("run-1").await.unwrap_err();
        assert!(matches!(err, Error::Cache(_)));
    }
}
