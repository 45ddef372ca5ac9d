use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Result of one step of the best-effort entry write sequence.
#[derive(Debug, Clone, Serialize)]
pub struct FieldWrite {
    pub field: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldWrite {
    pub fn ok(field: &str) -> Self {
        Self {
            field: field.to_string(),
            ok: true,
            error: None,
        }
    }

    pub fn failed(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            ok: false,
            error: Some(message.into()),
        }
    }
}

/// How category assignment ended for an entry. A missing taxonomy term
/// leaves the entry uncategorized; that is an observable outcome here,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CategoryOutcome {
    Assigned { term_id: i64 },
    Uncategorized,
}

/// What happened to a single feed record during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome")]
pub enum RecordOutcome {
    Written {
        stock_id: i64,
        entry_id: i64,
        computed_price: Decimal,
        category: CategoryOutcome,
        fields: Vec<FieldWrite>,
    },
    Ineligible {
        stock_id: i64,
        category: String,
    },
    AlreadyImported {
        stock_id: i64,
    },
    CapReached {
        stock_id: i64,
    },
    Failed {
        stock_id: i64,
        error: String,
    },
}

/// Aggregated outcome of one orchestration run, reported back to the
/// admin-facing caller.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub run_id: String,
    pub snapshot_fetched: bool,
    pub total_records: usize,
    pub written: usize,
    pub ineligible: usize,
    pub already_imported: usize,
    pub capped: usize,
    pub failed: usize,
    pub records: Vec<RecordOutcome>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ImportReport {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            snapshot_fetched: false,
            total_records: 0,
            written: 0,
            ineligible: 0,
            already_imported: 0,
            capped: 0,
            failed: 0,
            records: Vec::new(),
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    pub fn push(&mut self, outcome: RecordOutcome) {
        match &outcome {
            RecordOutcome::Written { .. } => self.written += 1,
            RecordOutcome::Ineligible { .. } => self.ineligible += 1,
            RecordOutcome::AlreadyImported { .. } => self.already_imported += 1,
            RecordOutcome::CapReached { .. } => self.capped += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
        self.records.push(outcome);
    }
}
