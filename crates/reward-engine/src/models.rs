//! 奖励引擎领域模型

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 奖励类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardType {
    /// 积分
    Point,
    /// 现金
    Cash,
    /// 优惠券
    Coupon,
    /// 道具
    Item,
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Point => "POINT",
            Self::Cash => "CASH",
            Self::Coupon => "COUPON",
            Self::Item => "ITEM",
        };
        write!(f, "{}", s)
    }
}

/// 奖励项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardItem {
    #[serde(rename = "type")]
    pub reward_type: RewardType,
    pub amount: f64,
}

impl RewardItem {
    pub fn new(reward_type: RewardType, amount: f64) -> Self {
        Self {
            reward_type,
            amount,
        }
    }
}

/// 规则类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// 指标达到阈值时发放
    PerCondition,
    /// 阶梯累计规则中的一个阶段
    Stage,
    /// 前置规则全部达成后发放
    Final,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerCondition => "PER_CONDITION",
            Self::Stage => "STAGE",
            Self::Final => "FINAL",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PER_CONDITION" => Ok(Self::PerCondition),
            "STAGE" => Ok(Self::Stage),
            "FINAL" => Ok(Self::Final),
            other => Err(RuleError::UnsupportedRuleType(other.to_string())),
        }
    }
}

/// 持久化的规则定义
///
/// `rule_type` 保留原始字符串，未知类型在构建规则集时才被拒绝；
/// `config` 的结构取决于规则类型，由 [`crate::validator`] 校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    pub id: String,
    pub rule_type: String,
    #[serde(default)]
    pub reward_items: Vec<RewardItem>,
    pub config: Value,
}

impl RuleSpec {
    pub fn new(id: impl Into<String>, rule_type: impl Into<String>, config: Value) -> Self {
        Self {
            id: id.into(),
            rule_type: rule_type.into(),
            reward_items: Vec::new(),
            config,
        }
    }

    pub fn per_condition(id: impl Into<String>, metric: &str, per_threshold: f64) -> Self {
        Self::new(
            id,
            RuleType::PerCondition.as_str(),
            json!({ "metric": metric, "perThreshold": per_threshold }),
        )
    }

    pub fn stage(id: impl Into<String>, metric: &str, stage_threshold: f64) -> Self {
        Self::new(
            id,
            RuleType::Stage.as_str(),
            json!({ "metric": metric, "stageThreshold": stage_threshold }),
        )
    }

    pub fn final_rule<S: AsRef<str>>(id: impl Into<String>, prerequisite_rule_ids: &[S]) -> Self {
        let ids: Vec<&str> = prerequisite_rule_ids.iter().map(|s| s.as_ref()).collect();
        Self::new(
            id,
            RuleType::Final.as_str(),
            json!({ "prerequisiteRuleIds": ids }),
        )
    }

    /// 追加一个奖励项
    pub fn with_reward(mut self, item: RewardItem) -> Self {
        self.reward_items.push(item);
        self
    }
}

/// 用户活动指标快照
///
/// 指标名到非负数值的映射。缺失的指标按 0 参与比较。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityMetrics {
    values: HashMap<String, f64>,
}

impl ActivityMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式设置指标
    pub fn with(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.values.insert(metric.into(), value);
        self
    }

    pub fn insert(&mut self, metric: impl Into<String>, value: f64) {
        self.values.insert(metric.into(), value);
    }

    /// 获取指标值，不存在时返回 0
    pub fn get(&self, metric: &str) -> f64 {
        self.values.get(metric).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.values.contains_key(metric)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ActivityMetrics {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
