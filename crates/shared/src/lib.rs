//! 共享库
//!
//! 包含奖励服务共用的配置加载、错误类型以及日志与指标初始化。

pub mod config;
pub mod error;
pub mod observability;

pub use config::{AppConfig, RewardConfig};
pub use error::{Result, SharedError};
pub use observability::{ObservabilityConfig, ObservabilityGuard};
