pub mod record;
pub mod report;

pub use record::FeedRecord;
pub use report::{CategoryOutcome, FieldWrite, ImportReport, RecordOutcome};
