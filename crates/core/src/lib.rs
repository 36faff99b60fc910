pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod traits;

pub use config::{
    BehaviorConfig, LoggingConfig, RunnerConfig, SelectorConfig, StrategyConfig, VersionOrdering,
};
pub use errors::*;
pub use models::{
    build_worker_set, TaskDescriptor, TierAffinityConfig, TierRule, WorkerRecord, WorkerSet,
    WorkerSnapshot,
};
pub use traits::WorkerSelectStrategy;
