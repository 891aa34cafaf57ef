//! 活动奖励服务错误类型
//!
//! 每个业务错误对应一个稳定的 `EVENT_00xx` 错误码和一个 HTTP 语义的状态码，
//! 供外层接口直接映射响应。

use reward_engine::RuleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    // === 活动相关错误 ===
    #[error("活动不存在: {0}")]
    EventNotFound(String),

    #[error("活动状态无效: {0}")]
    InvalidEventStatus(String),

    #[error("活动时间窗口无效: {0}")]
    InvalidEventPeriod(String),

    #[error("活动名称已存在: {0}")]
    DuplicatedEvent(String),

    #[error("活动未启用: {0}")]
    EventInactive(String),

    // === 奖励规则相关错误 ===
    #[error("奖励规则不存在: event_id={event_id}, rule_id={rule_id}")]
    RewardRuleNotFound { event_id: String, rule_id: String },

    #[error("奖励添加失败: {0}")]
    RewardAdditionFailed(String),

    #[error("规则错误: {0}")]
    Rule(#[from] RuleError),

    // === 发放请求相关错误 ===
    #[error("奖励已领取: user_id={user_id}, event_id={event_id}, rule_id={rule_id}")]
    RewardAlreadyClaimed {
        user_id: String,
        event_id: String,
        rule_id: String,
    },

    #[error("用户活跃数据不存在: {0}")]
    UserActivityNotFound(String),

    #[error("奖励发放请求不存在: {0}")]
    RewardRequestNotFound(String),

    #[error("奖励发放请求不是待审核状态: id={id}, current_status={current_status}")]
    RewardRequestNotPending { id: String, current_status: String },

    // === 系统错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 活动奖励服务 Result 类型别名
pub type Result<T> = std::result::Result<T, EventError>;

impl EventError {
    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EventNotFound(_) => "EVENT_0001",
            Self::InvalidEventStatus(_) => "EVENT_0002",
            Self::InvalidEventPeriod(_) => "EVENT_0003",
            Self::RewardAlreadyClaimed { .. } => "EVENT_0005",
            Self::DuplicatedEvent(_) => "EVENT_0006",
            Self::Rule(RuleError::UnsupportedRuleType(_)) => "EVENT_0011",
            Self::RewardRuleNotFound { .. } => "EVENT_0012",
            Self::Rule(_) => "EVENT_0013",
            Self::RewardAdditionFailed(_) => "EVENT_0014",
            Self::UserActivityNotFound(_) => "EVENT_0015",
            Self::EventInactive(_) => "EVENT_0017",
            Self::RewardRequestNotFound(_) => "EVENT_0018",
            Self::RewardRequestNotPending { .. } => "EVENT_0020",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP 语义的状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EventNotFound(_)
            | Self::RewardRuleNotFound { .. }
            | Self::UserActivityNotFound(_)
            | Self::RewardRequestNotFound(_) => 404,
            Self::RewardAlreadyClaimed { .. } | Self::DuplicatedEvent(_) => 409,
            Self::Internal(_) => 500,
            _ => 400,
        }
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for EventError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
