pub mod app_config;
pub mod behavior;
pub mod runner;

// Re-export main types for easier imports
pub use crate::logging::LoggingConfig;
pub use app_config::SelectorConfig;
pub use behavior::{BehaviorConfig, StrategyConfig};
pub use runner::{RunnerConfig, VersionOrdering};
