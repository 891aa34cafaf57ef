//! 规则引擎错误类型
//!
//! 引擎只在构建规则集时失败，评估过程本身不产生错误。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("不支持的规则类型: {0}")]
    UnsupportedRuleType(String),

    #[error("规则配置无效: rule_id={rule_id}, {reason}")]
    InvalidRuleConfig { rule_id: String, reason: String },

    #[error("规则 ID 重复: {0}")]
    DuplicateRuleId(String),
}

impl RuleError {
    pub(crate) fn invalid_config(rule_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRuleConfig {
            rule_id: rule_id.to_string(),
            reason: reason.into(),
        }
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedRuleType(_) => "UNSUPPORTED_RULE_TYPE",
            Self::InvalidRuleConfig { .. } => "INVALID_RULE_CONFIG",
            Self::DuplicateRuleId(_) => "DUPLICATE_RULE_ID",
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
