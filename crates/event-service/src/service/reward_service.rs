//! 奖励规则管理服务
//!
//! 向活动的已有规则追加奖励项，或新建一条经过校验的规则。
//! 每次变更都会递增活动版本，使规则集缓存失效。

use std::sync::Arc;

use reward_engine::{RuleSet, parse_rule_config, validate_reward_items};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{EventError, Result};
use crate::models::{Event, RewardItem, RuleSpec};
use crate::repository::EventRepositoryTrait;
use crate::service::dto::{AddRewardRequest, NewRuleOptions};

pub struct RewardService<E: EventRepositoryTrait> {
    event_repo: Arc<E>,
}

impl<E: EventRepositoryTrait> RewardService<E> {
    pub fn new(event_repo: Arc<E>) -> Self {
        Self { event_repo }
    }

    /// 查询活动的全部奖励规则
    pub async fn find_rules(&self, event_id: &str) -> Result<Vec<RuleSpec>> {
        Ok(self.find_event(event_id).await?.reward_rules)
    }

    /// 向活动追加奖励
    ///
    /// 同时给出 `rule_id` 与 `new_rule` 时追加到已有规则；两者都没有时失败。
    /// 返回变更后的规则。
    #[instrument(skip(self, request), fields(event_id = %request.event_id))]
    pub async fn add_reward(&self, request: AddRewardRequest) -> Result<RuleSpec> {
        request.validate()?;

        let event = self.find_event(&request.event_id).await?;
        let options = request.rule_options.unwrap_or_default();

        if let Some(rule_id) = options.rule_id {
            return self
                .append_to_rule(&event, &rule_id, &request.reward_item)
                .await;
        }

        if let Some(new_rule) = options.new_rule {
            return self
                .create_rule(&event, new_rule, request.reward_item)
                .await;
        }

        Err(EventError::RewardAdditionFailed(
            "必须指定已有规则 ID 或新规则定义".to_string(),
        ))
    }

    async fn append_to_rule(
        &self,
        event: &Event,
        rule_id: &str,
        item: &RewardItem,
    ) -> Result<RuleSpec> {
        let not_found = || EventError::RewardRuleNotFound {
            event_id: event.id.clone(),
            rule_id: rule_id.to_string(),
        };

        event.find_rule(rule_id).ok_or_else(not_found)?;
        validate_reward_items(rule_id, std::slice::from_ref(item))?;

        let updated = self
            .event_repo
            .push_reward_item(&event.id, rule_id, item)
            .await?
            .ok_or_else(not_found)?;

        let rule = updated.find_rule(rule_id).cloned().ok_or_else(not_found)?;

        info!(
            rule_id = %rule_id,
            reward_type = %item.reward_type,
            amount = item.amount,
            version = updated.version,
            "Reward item appended to rule"
        );

        Ok(rule)
    }

    async fn create_rule(
        &self,
        event: &Event,
        options: NewRuleOptions,
        item: RewardItem,
    ) -> Result<RuleSpec> {
        let rule_id = Uuid::now_v7().to_string();
        parse_rule_config(&rule_id, &options.rule_type, &options.config)?;

        let rule = RuleSpec::new(rule_id, options.rule_type, options.config).with_reward(item);

        // 追加后的规则集必须仍可构建
        let mut candidate = event.reward_rules.clone();
        candidate.push(rule.clone());
        RuleSet::build(&candidate)?;

        let updated = self
            .event_repo
            .push_rule(&event.id, &rule)
            .await?
            .ok_or_else(|| EventError::EventNotFound(event.id.clone()))?;

        info!(
            rule_id = %rule.id,
            rule_type = %rule.rule_type,
            version = updated.version,
            "Reward rule created"
        );

        Ok(rule)
    }

    async fn find_event(&self, event_id: &str) -> Result<Event> {
        self.event_repo
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| EventError::EventNotFound(event_id.to_string()))
    }
}
