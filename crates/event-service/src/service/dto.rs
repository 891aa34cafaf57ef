//! 服务层请求/响应 DTO
//!
//! 请求 DTO 使用 validator 做字段级校验，服务入口统一调用 `validate()`。

use chrono::{DateTime, Utc};
use reward_engine::{RewardItem, RewardRequestStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

// ==================== 奖励发放请求 ====================

/// 创建奖励发放请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRewardRequest {
    #[validate(length(min = 1, max = 64, message = "用户 ID 长度应在 1-64 个字符"))]
    pub user_id: String,
}

impl CreateRewardRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// 审批通过
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRewardRequest {
    #[validate(length(min = 1, message = "发放请求 ID 不能为空"))]
    pub reward_request_id: String,
    #[validate(length(min = 1, message = "审批人 ID 不能为空"))]
    pub approver_id: String,
}

/// 审批驳回
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectRewardRequest {
    #[validate(length(min = 1, message = "发放请求 ID 不能为空"))]
    pub reward_request_id: String,
    #[validate(length(min = 1, message = "审批人 ID 不能为空"))]
    pub approver_id: String,
    #[validate(length(min = 1, max = 500, message = "驳回原因长度应在 1-500 个字符"))]
    pub reason: String,
}

/// 发放请求分页查询，页码从 1 开始
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RewardRequestQuery {
    pub event_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<RewardRequestStatus>,
    #[validate(range(min = 1, message = "页码从 1 开始"))]
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

// ==================== 奖励规则 ====================

/// 新建规则的定义
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRuleOptions {
    pub rule_type: String,
    pub config: Value,
}

/// 追加奖励的目标规则：已有规则或新规则，两者都给出时使用已有规则
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOptions {
    pub rule_id: Option<String>,
    pub new_rule: Option<NewRuleOptions>,
}

/// 向活动追加奖励
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddRewardRequest {
    #[validate(length(min = 1, message = "活动 ID 不能为空"))]
    pub event_id: String,
    pub reward_item: RewardItem,
    #[serde(default)]
    pub rule_options: Option<RuleOptions>,
}

// ==================== 活动 ====================

/// 创建活动
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 100, message = "活动名称长度应在 1-100 个字符"))]
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    #[serde(default = "default_auto_reward")]
    pub auto_reward: bool,
}

fn default_auto_reward() -> bool {
    true
}

/// 更新活动状态，状态值在服务层解析
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventStatusRequest {
    #[validate(length(min = 1, message = "活动 ID 不能为空"))]
    pub event_id: String,
    pub status: String,
}

/// 活动分页查询
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    #[serde(default)]
    pub active_only: bool,
    #[validate(range(min = 1, message = "页码从 1 开始"))]
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

// ==================== 用户活跃数据 ====================

/// 写入用户活跃快照
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityUpsert {
    #[validate(length(min = 1, max = 64, message = "用户 ID 长度应在 1-64 个字符"))]
    pub user_id: String,
    #[serde(default)]
    pub login_streak: u32,
    #[serde(default)]
    pub invite_count: u32,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "累计消费必须为非负数"))]
    pub purchase_total: f64,
}

// ==================== 通用 ====================

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Paginated<T> {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }
}
