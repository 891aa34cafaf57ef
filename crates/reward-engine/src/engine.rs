//! 奖励引擎
//!
//! 按规则集顺序对每条规则评估一次，所有规则共享同一个已达成集合，
//! 因此靠后的规则能看到本次遍历中靠前规则新达成的 ID。

use crate::builder::RuleSet;
use crate::models::{ActivityMetrics, RewardItem, RuleType};
use crate::rules::{AchievedSet, RuleDecision};
use serde::Serialize;

/// 单条规则的评估追踪
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTrace {
    pub rule_id: String,
    pub rule_type: RuleType,
    pub decision: RuleDecision,
}

/// 引擎输出
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOutcome {
    /// 本次新达成的规则 ID（按评估顺序，不含历史 ID）
    pub new_achieved_rule_ids: Vec<String>,
    /// 新达成规则的奖励项（按评估顺序拼接）
    pub rewards: Vec<RewardItem>,
    /// 仅在启用追踪时填充
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<RuleTrace>,
}

impl EngineOutcome {
    /// 没有任何新达成规则
    pub fn is_empty(&self) -> bool {
        self.new_achieved_rule_ids.is_empty() && self.rewards.is_empty()
    }
}

/// 奖励引擎
///
/// 引擎本身无状态，可在多个线程中并发调用 `run`，每次调用使用独立的已达成集合。
#[derive(Debug, Clone, Copy)]
pub struct RewardEngine<'a> {
    rule_set: &'a RuleSet,
    trace_enabled: bool,
}

impl<'a> RewardEngine<'a> {
    pub fn new(rule_set: &'a RuleSet) -> Self {
        Self {
            rule_set,
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    pub fn rule_set(&self) -> &'a RuleSet {
        self.rule_set
    }

    /// 执行一次评估
    ///
    /// `past_rule_ids` 是用户在该活动中已成功发放过的规则 ID，只读。
    pub fn run<S: AsRef<str>>(
        &self,
        activity: &ActivityMetrics,
        past_rule_ids: &[S],
    ) -> EngineOutcome {
        let rules = self.rule_set.rules();
        let mut achieved = AchievedSet::from_past(past_rule_ids);
        let mut rewards = Vec::new();
        let mut trace = Vec::new();

        for rule in rules {
            let (decision, items) = rule.evaluate(rules, activity, &mut achieved);

            if !items.is_empty() {
                rewards.extend_from_slice(items);
            }

            if self.trace_enabled {
                trace.push(RuleTrace {
                    rule_id: rule.id().to_string(),
                    rule_type: rule.rule_type(),
                    decision,
                });
            }
        }

        EngineOutcome {
            new_achieved_rule_ids: achieved.into_newly_achieved(),
            rewards,
            trace,
        }
    }
}
