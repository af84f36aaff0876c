pub mod bucket;
pub mod catchup;
pub mod orchestrator;

pub use bucket::bucket_commits;
pub use catchup::{last_persisted_day, reconcile, shadow_records, Reconciled};
pub use orchestrator::Orchestrator;
