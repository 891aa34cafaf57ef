//! 奖励规则评估引擎
//!
//! 根据用户的累计活动指标与已达成规则集合，在一次确定性遍历中计算：
//! - 本次新达成的规则 ID
//! - 本次应发放的奖励项
//!
//! 支持三类规则：
//! - `PER_CONDITION`：指标达到阈值时发放一次
//! - `STAGE`：阶梯式累计规则的单个阶段
//! - `FINAL`：所有前置规则达成后发放的最终奖励
//!
//! 引擎是纯函数：无 I/O、无日志、无时钟依赖，只在构建阶段返回错误。

pub mod builder;
pub mod engine;
pub mod error;
pub mod models;
pub mod rules;
pub mod status;
pub mod validator;

pub use builder::{RuleSet, RuleSetBuilder};
pub use engine::{EngineOutcome, RewardEngine, RuleTrace};
pub use error::{Result, RuleError};
pub use models::{ActivityMetrics, RewardItem, RewardType, RuleSpec, RuleType};
pub use rules::{AchievedSet, FinalRule, PerConditionRule, Rule, RuleDecision, RuleKind, StageRule};
pub use status::{RewardRequestStatus, StatusDecision, decide_status};
pub use validator::{
    FinalConfig, PerConditionConfig, RuleConfig, StageConfig, parse_rule_config,
    validate_reward_items, validate_rule_spec,
};
