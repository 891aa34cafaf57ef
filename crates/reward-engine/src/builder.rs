//! 规则集构建器
//!
//! 将持久化的规则定义转换成可评估的规则集，分三个阶段：
//! 1. 检查所有规则类型，存在不支持的类型时优先报告
//! 2. 按输入顺序逐条校验并构建规则（STAGE 规则暂不关联同级阶段）
//! 3. 规则集完整后，为每条 STAGE 规则记录其他 STAGE 规则的下标
//!
//! 任一定义不合法则整体失败，不返回部分结果。

use crate::error::{Result, RuleError};
use crate::models::{RuleSpec, RuleType};
use crate::rules::{FinalRule, PerConditionRule, Rule, RuleKind, StageRule};
use crate::validator::{RuleConfig, validate_rule_spec};
use std::collections::HashSet;

/// 构建完成的规则集
///
/// 规则顺序即评估顺序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// 从规则定义构建
    pub fn build(specs: &[RuleSpec]) -> Result<Self> {
        RuleSetBuilder::new().build(specs)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.id())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// 规则集构建器
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: Vec<Rule>,
    seen_ids: HashSet<String>,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构建规则集
    pub fn build(mut self, specs: &[RuleSpec]) -> Result<RuleSet> {
        for spec in specs {
            spec.rule_type.parse::<RuleType>()?;
        }

        self.rules.reserve(specs.len());
        for spec in specs {
            self.push(spec)?;
        }

        self.link_stage_peers();

        Ok(RuleSet { rules: self.rules })
    }

    /// 第二阶段：校验并构建单条规则
    fn push(&mut self, spec: &RuleSpec) -> Result<()> {
        let config = validate_rule_spec(spec)?;

        if !self.seen_ids.insert(spec.id.clone()) {
            return Err(RuleError::DuplicateRuleId(spec.id.clone()));
        }

        let kind = match config {
            RuleConfig::PerCondition(cfg) => RuleKind::PerCondition(PerConditionRule::new(cfg)),
            RuleConfig::Stage(cfg) => RuleKind::Stage(StageRule::new(cfg)),
            RuleConfig::Final(cfg) => RuleKind::Final(FinalRule::new(cfg)),
        };

        self.rules
            .push(Rule::new(spec.id.clone(), spec.reward_items.clone(), kind));
        Ok(())
    }

    /// 第三阶段：关联同级 STAGE 规则
    fn link_stage_peers(&mut self) {
        let stage_indices: Vec<usize> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, r)| matches!(r.kind(), RuleKind::Stage(_)))
            .map(|(i, _)| i)
            .collect();

        for &index in &stage_indices {
            if let RuleKind::Stage(stage) = self.rules[index].kind_mut() {
                stage.peers = stage_indices
                    .iter()
                    .copied()
                    .filter(|&i| i != index)
                    .collect();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RewardItem, RewardType};
    use serde_json::json;

    fn sample_specs() -> Vec<RuleSpec> {
        vec![
            RuleSpec::per_condition("login3", "loginStreak", 3.0)
                .with_reward(RewardItem::new(RewardType::Point, 100.0)),
            RuleSpec::stage("stage2", "purchaseTotal", 2.0)
                .with_reward(RewardItem::new(RewardType::Coupon, 1.0)),
            RuleSpec::stage("stage3", "purchaseTotal", 3.0)
                .with_reward(RewardItem::new(RewardType::Coupon, 2.0)),
            RuleSpec::final_rule("final", &["login3", "stage2"])
                .with_reward(RewardItem::new(RewardType::Cash, 5.0)),
        ]
    }

    #[test]
    fn test_build_preserves_order() {
        let rule_set = RuleSet::build(&sample_specs()).unwrap();

        let ids: Vec<&str> = rule_set.ids().collect();
        assert_eq!(ids, vec!["login3", "stage2", "stage3", "final"]);

        let types: Vec<RuleType> = rule_set.rules().iter().map(|r| r.rule_type()).collect();
        assert_eq!(
            types,
            vec![RuleType::PerCondition, RuleType::Stage, RuleType::Stage, RuleType::Final]
        );
    }

    #[test]
    fn test_stage_peers_linked() {
        let rule_set = RuleSet::build(&sample_specs()).unwrap();

        let peers_of = |id: &str| match rule_set.rules().iter().find(|r| r.id() == id).unwrap().kind() {
            RuleKind::Stage(stage) => stage.peers().to_vec(),
            _ => panic!("{} 不是 STAGE 规则", id),
        };

        assert_eq!(peers_of("stage2"), vec![2]);
        assert_eq!(peers_of("stage3"), vec![1]);
    }

    #[test]
    fn test_build_empty() {
        let rule_set = RuleSet::build(&[]).unwrap();
        assert!(rule_set.is_empty());
    }

    #[test]
    fn test_build_rejects_unsupported_type() {
        let mut specs = sample_specs();
        specs.push(RuleSpec::new("bonus", "BONUS", json!({})));

        let result = RuleSet::build(&specs);
        assert_eq!(result, Err(RuleError::UnsupportedRuleType("BONUS".to_string())));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let specs = vec![RuleSpec::new(
            "bad",
            "PER_CONDITION",
            json!({"metric": "loginStreak"}),
        )];

        let err = RuleSet::build(&specs).unwrap_err();
        assert!(matches!(err, RuleError::InvalidRuleConfig { ref rule_id, .. } if rule_id == "bad"));
    }

    #[test]
    fn test_unsupported_type_reported_before_invalid_config() {
        let specs = vec![
            RuleSpec::new("a", "PER_CONDITION", json!({"metric": "loginStreak"})),
            RuleSpec::new("b", "BONUS", json!({})),
        ];

        let result = RuleSet::build(&specs);
        assert_eq!(result, Err(RuleError::UnsupportedRuleType("BONUS".to_string())));
    }

    #[test]
    fn test_build_rejects_duplicate_id() {
        let specs = vec![
            RuleSpec::per_condition("dup", "loginStreak", 1.0),
            RuleSpec::per_condition("dup", "inviteCount", 1.0),
        ];

        let result = RuleSet::build(&specs);
        assert_eq!(result, Err(RuleError::DuplicateRuleId("dup".to_string())));
    }
}
