//! 规则配置校验
//!
//! 按规则类型解析 `config`，只接受白名单字段，拒绝多余字段。
//! 构建规则集和新增规则共用同一套校验。

use crate::error::{Result, RuleError};
use crate::models::{RewardItem, RuleSpec, RuleType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// PER_CONDITION 规则配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PerConditionConfig {
    pub metric: String,
    pub per_threshold: f64,
}

/// STAGE 规则配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StageConfig {
    pub metric: String,
    pub stage_threshold: f64,
}

/// FINAL 规则配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FinalConfig {
    pub prerequisite_rule_ids: Vec<String>,
}

/// 解析后的规则配置
#[derive(Debug, Clone, PartialEq)]
pub enum RuleConfig {
    PerCondition(PerConditionConfig),
    Stage(StageConfig),
    Final(FinalConfig),
}

impl RuleConfig {
    pub fn rule_type(&self) -> RuleType {
        match self {
            Self::PerCondition(_) => RuleType::PerCondition,
            Self::Stage(_) => RuleType::Stage,
            Self::Final(_) => RuleType::Final,
        }
    }
}

/// 校验完整的规则定义（类型、配置、奖励项）
pub fn validate_rule_spec(spec: &RuleSpec) -> Result<RuleConfig> {
    let config = parse_rule_config(&spec.id, &spec.rule_type, &spec.config)?;
    validate_reward_items(&spec.id, &spec.reward_items)?;
    Ok(config)
}

/// 按规则类型解析并校验配置
///
/// 未知类型返回 `UnsupportedRuleType`，结构或取值不合法返回 `InvalidRuleConfig`。
pub fn parse_rule_config(rule_id: &str, rule_type: &str, config: &Value) -> Result<RuleConfig> {
    let rule_type: RuleType = rule_type.parse()?;

    match rule_type {
        RuleType::PerCondition => {
            let cfg: PerConditionConfig = deserialize(rule_id, config)?;
            validate_metric(rule_id, &cfg.metric)?;
            validate_threshold(rule_id, "perThreshold", cfg.per_threshold)?;
            Ok(RuleConfig::PerCondition(cfg))
        }
        RuleType::Stage => {
            let cfg: StageConfig = deserialize(rule_id, config)?;
            validate_metric(rule_id, &cfg.metric)?;
            validate_threshold(rule_id, "stageThreshold", cfg.stage_threshold)?;
            Ok(RuleConfig::Stage(cfg))
        }
        RuleType::Final => {
            let cfg: FinalConfig = deserialize(rule_id, config)?;
            if cfg.prerequisite_rule_ids.iter().any(|id| id.is_empty()) {
                return Err(RuleError::invalid_config(
                    rule_id,
                    "prerequisiteRuleIds 不能包含空 ID",
                ));
            }
            if cfg.prerequisite_rule_ids.iter().any(|id| id == rule_id) {
                return Err(RuleError::invalid_config(
                    rule_id,
                    "prerequisiteRuleIds 不能引用自身",
                ));
            }
            Ok(RuleConfig::Final(cfg))
        }
    }
}

/// 校验奖励项数量：必须是有限的非负数
pub fn validate_reward_items(rule_id: &str, items: &[RewardItem]) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if !item.amount.is_finite() || item.amount < 0.0 {
            return Err(RuleError::invalid_config(
                rule_id,
                format!("rewardItems[{}].amount 必须为非负数，当前为 {}", i, item.amount),
            ));
        }
    }
    Ok(())
}

fn deserialize<'de, T: Deserialize<'de>>(rule_id: &str, config: &'de Value) -> Result<T> {
    T::deserialize(config).map_err(|e| RuleError::invalid_config(rule_id, e.to_string()))
}

fn validate_metric(rule_id: &str, metric: &str) -> Result<()> {
    if metric.trim().is_empty() {
        return Err(RuleError::invalid_config(rule_id, "metric 不能为空"));
    }
    Ok(())
}

fn validate_threshold(rule_id: &str, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RuleError::invalid_config(
            rule_id,
            format!("{} 必须大于 0，当前为 {}", field, value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RewardType;
    use serde_json::json;

    #[test]
    fn test_parse_per_condition() {
        let config = parse_rule_config(
            "r1",
            "PER_CONDITION",
            &json!({"metric": "loginStreak", "perThreshold": 3}),
        )
        .unwrap();

        assert_eq!(
            config,
            RuleConfig::PerCondition(PerConditionConfig {
                metric: "loginStreak".to_string(),
                per_threshold: 3.0,
            })
        );
        assert_eq!(config.rule_type(), RuleType::PerCondition);
    }

    #[test]
    fn test_parse_unsupported_type() {
        let result = parse_rule_config("r1", "BONUS", &json!({}));
        assert_eq!(result, Err(RuleError::UnsupportedRuleType("BONUS".to_string())));
    }

    #[test]
    fn test_config_shape_must_match_type() {
        // STAGE 类型却给出 PER_CONDITION 的配置
        let result = parse_rule_config(
            "r1",
            "STAGE",
            &json!({"metric": "purchaseTotal", "perThreshold": 5}),
        );
        let err = result.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_RULE_CONFIG");
    }

    #[test]
    fn test_reject_unknown_fields() {
        let result = parse_rule_config(
            "r1",
            "PER_CONDITION",
            &json!({"metric": "loginStreak", "perThreshold": 3, "bonus": true}),
        );
        assert!(matches!(result, Err(RuleError::InvalidRuleConfig { .. })));
    }

    #[test]
    fn test_reject_non_positive_threshold() {
        for threshold in [0.0, -1.0] {
            let result = parse_rule_config(
                "r1",
                "STAGE",
                &json!({"metric": "purchaseTotal", "stageThreshold": threshold}),
            );
            assert!(result.is_err(), "threshold {} 应被拒绝", threshold);
        }
    }

    #[test]
    fn test_reject_empty_metric() {
        let result = parse_rule_config(
            "r1",
            "PER_CONDITION",
            &json!({"metric": "  ", "perThreshold": 3}),
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("metric 不能为空"));
    }

    #[test]
    fn test_final_rule_prerequisites() {
        let ok = parse_rule_config("f", "FINAL", &json!({"prerequisiteRuleIds": ["a", "b"]}));
        assert!(ok.is_ok());

        let not_array = parse_rule_config("f", "FINAL", &json!({"prerequisiteRuleIds": "a"}));
        assert!(not_array.is_err());

        let self_ref = parse_rule_config("f", "FINAL", &json!({"prerequisiteRuleIds": ["f"]}));
        assert!(self_ref.unwrap_err().to_string().contains("不能引用自身"));
    }

    #[test]
    fn test_validate_reward_items() {
        let ok = vec![RewardItem::new(RewardType::Point, 0.0)];
        assert!(validate_reward_items("r1", &ok).is_ok());

        let negative = vec![
            RewardItem::new(RewardType::Point, 10.0),
            RewardItem::new(RewardType::Cash, -1.0),
        ];
        let err = validate_reward_items("r1", &negative).unwrap_err();
        assert!(err.to_string().contains("rewardItems[1]"));
    }

    #[test]
    fn test_validate_rule_spec() {
        let spec = RuleSpec::stage("s1", "purchaseTotal", 5.0)
            .with_reward(RewardItem::new(RewardType::Coupon, 1.0));
        let config = validate_rule_spec(&spec).unwrap();
        assert_eq!(config.rule_type(), RuleType::Stage);
    }
}
