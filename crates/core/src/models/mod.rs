pub mod task;
pub mod tier;
pub mod worker;

pub use task::TaskDescriptor;
pub use tier::{TierAffinityConfig, TierRule};
pub use worker::{build_worker_set, WorkerRecord, WorkerSet, WorkerSnapshot};
