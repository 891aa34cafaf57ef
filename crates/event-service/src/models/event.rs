//! 活动模型

use super::EventStatus;
use chrono::{DateTime, Utc};
use reward_engine::RuleSpec;
use serde::{Deserialize, Serialize};

/// 活动
///
/// `reward_rules` 的顺序即引擎评估顺序。规则每次变更 `version` 加一，
/// 规则集缓存以 (id, version) 判断是否过期。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default = "default_auto_reward")]
    pub auto_reward: bool,
    #[serde(default)]
    pub reward_rules: Vec<RuleSpec>,
    #[serde(default)]
    pub version: u64,
}

fn default_auto_reward() -> bool {
    true
}

impl Event {
    pub fn is_active(&self) -> bool {
        self.status == EventStatus::Active
    }

    /// 时间窗口是否包含 `now`（两端闭区间）
    pub fn is_within_period(&self, now: DateTime<Utc>) -> bool {
        self.started_at <= now && now <= self.ended_at
    }

    pub fn find_rule(&self, rule_id: &str) -> Option<&RuleSpec> {
        self.reward_rules.iter().find(|r| r.id == rule_id)
    }

    pub(crate) fn find_rule_mut(&mut self, rule_id: &str) -> Option<&mut RuleSpec> {
        self.reward_rules.iter_mut().find(|r| r.id == rule_id)
    }

    /// 规则变更后调用
    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}
