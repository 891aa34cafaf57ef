//! 规则评估器
//!
//! 三种规则变体共享同一个评估约定：
//! - 首次满足条件时，将自身 ID 加入已达成集合并返回奖励项
//! - 其他情况返回空切片，且不修改已达成集合
//!
//! 规则之间的引用（STAGE 规则查看同级阶段）通过规则集中的下标完成，
//! 评估时由调用方传入完整的规则切片。

use crate::models::{ActivityMetrics, RewardItem, RuleType};
use crate::validator::{FinalConfig, PerConditionConfig, StageConfig};
use serde::Serialize;
use std::collections::HashSet;

/// 单条规则的评估结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleDecision {
    /// 本次新达成
    Granted,
    /// 已在历史或本次遍历中达成
    AlreadyAchieved,
    /// 指标未达到阈值
    BelowThreshold,
    /// 完成阶段数小于阶段阈值
    StageCountNotReached,
    /// 同阈值的阶段已发放
    StageAlreadyRewarded,
    /// 前置规则未全部达成
    PrerequisitesMissing,
}

impl RuleDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// 已达成规则集合
///
/// 以历史 ID 为种子，记录本次遍历中新增 ID 的插入顺序。
#[derive(Debug, Clone, Default)]
pub struct AchievedSet {
    ids: HashSet<String>,
    added: Vec<String>,
}

impl AchievedSet {
    /// 以历史达成的规则 ID 初始化（自动去重）
    pub fn from_past<S: AsRef<str>>(past_rule_ids: &[S]) -> Self {
        Self {
            ids: past_rule_ids.iter().map(|s| s.as_ref().to_string()).collect(),
            added: Vec::new(),
        }
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.ids.contains(rule_id)
    }

    /// 加入一个规则 ID，已存在时返回 false
    pub fn insert(&mut self, rule_id: &str) -> bool {
        if self.ids.contains(rule_id) {
            return false;
        }
        self.ids.insert(rule_id.to_string());
        self.added.push(rule_id.to_string());
        true
    }

    /// 本次遍历新增的 ID（按加入顺序）
    pub fn newly_achieved(&self) -> &[String] {
        &self.added
    }

    pub fn into_newly_achieved(self) -> Vec<String> {
        self.added
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// PER_CONDITION：指标达到阈值即达成，只发放一次
#[derive(Debug, Clone, PartialEq)]
pub struct PerConditionRule {
    pub metric: String,
    pub per_threshold: f64,
}

impl PerConditionRule {
    pub fn new(config: PerConditionConfig) -> Self {
        Self {
            metric: config.metric,
            per_threshold: config.per_threshold,
        }
    }

    fn decide(&self, activity: &ActivityMetrics) -> RuleDecision {
        if activity.get(&self.metric) >= self.per_threshold {
            RuleDecision::Granted
        } else {
            RuleDecision::BelowThreshold
        }
    }
}

/// STAGE：阶梯规则中的一个阶段
#[derive(Debug, Clone, PartialEq)]
pub struct StageRule {
    pub metric: String,
    pub stage_threshold: f64,
    /// 同一规则集中其他 STAGE 规则的下标
    pub(crate) peers: Vec<usize>,
}

impl StageRule {
    pub fn new(config: StageConfig) -> Self {
        Self {
            metric: config.metric,
            stage_threshold: config.stage_threshold,
            peers: Vec::new(),
        }
    }

    pub fn peers(&self) -> &[usize] {
        &self.peers
    }

    fn decide(
        &self,
        rules: &[Rule],
        activity: &ActivityMetrics,
        achieved: &AchievedSet,
    ) -> RuleDecision {
        let current = activity.get(&self.metric);
        if current < self.stage_threshold {
            return RuleDecision::BelowThreshold;
        }

        // 完成阶段数与阶段阈值本身比较（沿用既有的发放口径，不要改成"达到阈值"）
        let achieved_stages = (current / self.stage_threshold).floor();
        if achieved_stages < self.stage_threshold {
            return RuleDecision::StageCountNotReached;
        }

        let already_rewarded = self
            .peers
            .iter()
            .filter_map(|&i| rules.get(i))
            .filter(|peer| achieved.contains(peer.id()))
            .filter_map(|peer| peer.stage_threshold())
            .any(|threshold| threshold == self.stage_threshold);

        if already_rewarded {
            RuleDecision::StageAlreadyRewarded
        } else {
            RuleDecision::Granted
        }
    }
}

/// FINAL：所有前置规则达成后发放
#[derive(Debug, Clone, PartialEq)]
pub struct FinalRule {
    pub prerequisite_rule_ids: Vec<String>,
}

impl FinalRule {
    pub fn new(config: FinalConfig) -> Self {
        Self {
            prerequisite_rule_ids: config.prerequisite_rule_ids,
        }
    }

    fn decide(&self, achieved: &AchievedSet) -> RuleDecision {
        if self
            .prerequisite_rule_ids
            .iter()
            .all(|id| achieved.contains(id))
        {
            RuleDecision::Granted
        } else {
            RuleDecision::PrerequisitesMissing
        }
    }
}

/// 规则变体
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    PerCondition(PerConditionRule),
    Stage(StageRule),
    Final(FinalRule),
}

/// 可评估的规则
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    id: String,
    reward_items: Vec<RewardItem>,
    kind: RuleKind,
}

impl Rule {
    pub fn new(id: impl Into<String>, reward_items: Vec<RewardItem>, kind: RuleKind) -> Self {
        Self {
            id: id.into(),
            reward_items,
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn reward_items(&self) -> &[RewardItem] {
        &self.reward_items
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut RuleKind {
        &mut self.kind
    }

    pub fn rule_type(&self) -> RuleType {
        match self.kind {
            RuleKind::PerCondition(_) => RuleType::PerCondition,
            RuleKind::Stage(_) => RuleType::Stage,
            RuleKind::Final(_) => RuleType::Final,
        }
    }

    /// STAGE 规则的阶段阈值，其他类型返回 None
    pub fn stage_threshold(&self) -> Option<f64> {
        match &self.kind {
            RuleKind::Stage(stage) => Some(stage.stage_threshold),
            _ => None,
        }
    }

    /// 只判断，不修改已达成集合
    pub fn decide(
        &self,
        rules: &[Rule],
        activity: &ActivityMetrics,
        achieved: &AchievedSet,
    ) -> RuleDecision {
        if achieved.contains(&self.id) {
            return RuleDecision::AlreadyAchieved;
        }

        match &self.kind {
            RuleKind::PerCondition(rule) => rule.decide(activity),
            RuleKind::Stage(rule) => rule.decide(rules, activity, achieved),
            RuleKind::Final(rule) => rule.decide(achieved),
        }
    }

    /// 评估规则
    ///
    /// `rules` 是本规则所在的完整规则集，STAGE 规则通过下标查看同级阶段。
    /// 达成时把自身 ID 加入 `achieved` 并返回奖励项，否则返回空切片。
    pub fn evaluate(
        &self,
        rules: &[Rule],
        activity: &ActivityMetrics,
        achieved: &mut AchievedSet,
    ) -> (RuleDecision, &[RewardItem]) {
        let decision = self.decide(rules, activity, achieved);
        if decision.is_granted() {
            achieved.insert(&self.id);
            (decision, &self.reward_items)
        } else {
            (decision, &[])
        }
    }
}
