//! Fan-out of many addresses over a bounded pool of verification workers.

mod coordinator;
mod summary;

pub use coordinator::{BulkProgress, DEFAULT_WORKERS, bulk_verify, bulk_verify_with_progress};
pub use summary::BulkSummary;
