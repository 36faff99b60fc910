//! 配置管理
//!
//! - **runner**: 注入到选择算法的运行时策略（版本比较规则、可用组拥挤策略）
//! - **behavior**: Worker行为文档（JSON），决定使用哪种选择策略以及Tier亲和配置
//! - **app_config**: 选择器进程配置（TOML + `SELECTOR_` 环境变量覆盖）
//!
//! 所有配置都在加载时校验；选择算法只接收已校验的配置。

pub mod models;

pub use models::{
    BehaviorConfig, LoggingConfig, RunnerConfig, SelectorConfig, StrategyConfig, VersionOrdering,
};
