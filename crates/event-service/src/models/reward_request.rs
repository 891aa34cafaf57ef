//! 奖励发放请求模型

use chrono::{DateTime, Utc};
use reward_engine::{RewardItem, RewardRequestStatus};
use serde::{Deserialize, Serialize};

/// 奖励发放请求
///
/// 每次发放尝试落库一条，包括条件不满足的失败记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRequest {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub condition_met: bool,
    /// 本次新达成的规则 ID
    pub rule_ids: Vec<String>,
    pub rewards: Vec<RewardItem>,
    pub status: RewardRequestStatus,
    /// 驳回原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    /// 进入终态（SUCCESS / FAILED）的时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    /// 处理该请求的运营人员（审批或驳回）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

impl RewardRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RewardRequestStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == RewardRequestStatus::Success
    }
}
