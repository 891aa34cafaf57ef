//! 发放状态决策
//!
//! 根据引擎输出与活动的自动发放开关决定奖励请求状态。

use crate::engine::EngineOutcome;
use crate::models::RewardItem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 奖励请求状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardRequestStatus {
    /// 条件满足，等待人工审核
    Pending,
    /// 已发放
    Success,
    /// 条件不满足或审核被拒绝
    Failed,
}

impl RewardRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RewardRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDecision {
    pub status: RewardRequestStatus,
    pub condition_met: bool,
}

impl StatusDecision {
    pub fn from_outcome(auto_reward_enabled: bool, outcome: &EngineOutcome) -> Self {
        decide_status(
            auto_reward_enabled,
            &outcome.new_achieved_rule_ids,
            &outcome.rewards,
        )
    }
}

/// 决定请求状态
///
/// - 没有新达成规则或没有奖励项：FAILED
/// - 自动发放：SUCCESS
/// - 否则：PENDING
pub fn decide_status(
    auto_reward_enabled: bool,
    new_achieved_rule_ids: &[String],
    rewards: &[RewardItem],
) -> StatusDecision {
    let condition_met = !new_achieved_rule_ids.is_empty() && !rewards.is_empty();

    let status = if !condition_met {
        RewardRequestStatus::Failed
    } else if auto_reward_enabled {
        RewardRequestStatus::Success
    } else {
        RewardRequestStatus::Pending
    };

    StatusDecision {
        status,
        condition_met,
    }
}
