//! 共享错误类型
//!
//! 基础设施初始化阶段（配置加载、日志与指标安装）可能出现的错误。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SharedError {
    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    #[error("配置无效: {field} - {message}")]
    InvalidConfig { field: String, message: String },

    #[error("可观测性初始化失败: {0}")]
    Observability(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::Observability(_) => "OBSERVABILITY_ERROR",
        }
    }
}
