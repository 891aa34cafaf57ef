//! 奖励发放请求服务
//!
//! 处理奖励发放的核心业务流程，包括：
//! - 活动有效性检查（时间窗口、启用状态）
//! - 用户活跃数据解析
//! - 历史已发放规则收集
//! - 规则集构建（按活动版本缓存）与引擎评估
//! - 状态决策与落库
//! - 人工审批与驳回
//!
//! ## 发放流程
//!
//! 1. 加 (用户, 活动) 锁 -> 2. 活动检查 -> 3. 活跃数据 -> 4. 历史规则
//!    -> 5. 引擎评估 -> 6. 状态决策 -> 7. 落库（条件不满足也落库）

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use reward_engine::{EngineOutcome, RewardEngine, RewardRequestStatus, StatusDecision};
use reward_shared::RewardConfig;
use reward_shared::observability::metrics::{
    record_engine_evaluation, record_reward_request, record_rules_granted,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{EventError, Result};
use crate::lock::{KeyedLock, KeyedLockGuard};
use crate::models::{Event, RewardRequest, UserActivity};
use crate::repository::{
    EventRepositoryTrait, RewardRequestFilter, RewardRequestRepositoryTrait,
    UserActivityRepositoryTrait,
};
use crate::rule_cache::RuleSetCache;
use crate::service::dto::{
    ApproveRewardRequest, CreateRewardRequest, Paginated, RejectRewardRequest, RewardRequestQuery,
};
use crate::validator::EventValidator;

/// 奖励发放请求服务
///
/// 同一 (用户, 活动) 的发放与审批在进程内串行执行；仓储层的唯一性约束
/// 兜底保证同一规则不会被成功发放两次。
pub struct RewardRequestService<E, U, R>
where
    E: EventRepositoryTrait,
    U: UserActivityRepositoryTrait,
    R: RewardRequestRepositoryTrait,
{
    event_repo: Arc<E>,
    activity_repo: Arc<U>,
    request_repo: Arc<R>,
    rule_cache: Arc<RuleSetCache>,
    locks: KeyedLock,
    config: RewardConfig,
}

impl<E, U, R> RewardRequestService<E, U, R>
where
    E: EventRepositoryTrait,
    U: UserActivityRepositoryTrait,
    R: RewardRequestRepositoryTrait,
{
    pub fn new(
        event_repo: Arc<E>,
        activity_repo: Arc<U>,
        request_repo: Arc<R>,
        rule_cache: Arc<RuleSetCache>,
        config: RewardConfig,
    ) -> Self {
        Self {
            event_repo,
            activity_repo,
            request_repo,
            rule_cache,
            locks: KeyedLock::new(),
            config,
        }
    }

    /// 创建奖励发放请求
    ///
    /// 自动发放的活动条件满足时直接 SUCCESS，否则进入 PENDING 等待审批；
    /// 条件不满足时记录一条 FAILED 请求。
    #[instrument(skip(self, request), fields(event_id = %event_id, user_id = %request.user_id))]
    pub async fn create_reward_request(
        &self,
        event_id: &str,
        request: CreateRewardRequest,
    ) -> Result<RewardRequest> {
        request.validate()?;
        let user_id = request.user_id;

        let _guard = self
            .locks
            .acquire(&KeyedLock::reward_key(&user_id, event_id))
            .await;

        let now = Utc::now();
        let event = self.find_available_event(event_id, now).await?;
        let activity = self.find_user_activity(&user_id).await?;
        let past_rule_ids = self.past_rule_ids(event_id, &user_id).await?;

        let outcome = self.evaluate(&event, &activity, &past_rule_ids, false)?;
        let decision = StatusDecision::from_outcome(event.auto_reward, &outcome);

        let reward_request = build_reward_request(event_id, &user_id, outcome, decision, now);
        self.request_repo.create(&reward_request).await?;

        record_reward_request(reward_request.status.as_str());
        if reward_request.is_success() {
            record_rules_granted(reward_request.rule_ids.len());
        }

        info!(
            request_id = %reward_request.id,
            status = %reward_request.status,
            rule_ids = ?reward_request.rule_ids,
            rewards = reward_request.rewards.len(),
            auto_reward = event.auto_reward,
            "Reward request processed"
        );

        Ok(reward_request)
    }

    /// 预览一次评估结果（含逐条规则的决策追踪），不落库
    #[instrument(skip(self))]
    pub async fn preview_reward(&self, event_id: &str, user_id: &str) -> Result<EngineOutcome> {
        let event = self.find_available_event(event_id, Utc::now()).await?;
        let activity = self.find_user_activity(user_id).await?;
        let past_rule_ids = self.past_rule_ids(event_id, user_id).await?;

        self.evaluate(&event, &activity, &past_rule_ids, true)
    }

    /// 审批通过待处理的发放请求
    #[instrument(skip(self, request), fields(reward_request_id = %request.reward_request_id, approver_id = %request.approver_id))]
    pub async fn approve_reward_request(
        &self,
        request: ApproveRewardRequest,
    ) -> Result<RewardRequest> {
        request.validate()?;

        let (mut reward_request, _guard) =
            self.lock_pending_request(&request.reward_request_id).await?;

        let now = Utc::now();
        reward_request.status = RewardRequestStatus::Success;
        reward_request.approved_by = Some(request.approver_id.clone());
        reward_request.approved_at = Some(now);
        reward_request.processed_at = Some(now);

        self.request_repo.update(&reward_request).await?;
        record_rules_granted(reward_request.rule_ids.len());

        info!(
            rule_ids = ?reward_request.rule_ids,
            "Reward request approved"
        );

        Ok(reward_request)
    }

    /// 驳回待处理的发放请求
    #[instrument(skip(self, request), fields(reward_request_id = %request.reward_request_id, approver_id = %request.approver_id))]
    pub async fn reject_reward_request(
        &self,
        request: RejectRewardRequest,
    ) -> Result<RewardRequest> {
        request.validate()?;

        let (mut reward_request, _guard) =
            self.lock_pending_request(&request.reward_request_id).await?;

        reward_request.status = RewardRequestStatus::Failed;
        reward_request.reason = Some(request.reason.clone());
        reward_request.approved_by = Some(request.approver_id.clone());
        reward_request.processed_at = Some(Utc::now());

        self.request_repo.update(&reward_request).await?;

        info!(reason = %request.reason, "Reward request rejected");

        Ok(reward_request)
    }

    /// 分页查询发放请求，按请求时间倒序
    pub async fn paginate(&self, query: RewardRequestQuery) -> Result<Paginated<RewardRequest>> {
        query.validate()?;

        let page = query.page.unwrap_or(1);
        let page_size = self.config.clamp_page_size(query.page_size);
        let offset = (page as usize - 1) * page_size as usize;

        let filter = RewardRequestFilter {
            event_id: query.event_id,
            user_id: query.user_id,
            status: query.status,
        };

        let data = self
            .request_repo
            .find_all(&filter, offset, page_size as usize)
            .await?;
        let total = self.request_repo.count(&filter).await?;

        Ok(Paginated {
            data,
            total,
            page,
            page_size,
        })
    }

    /// 查询活动并检查时间窗口与启用状态
    async fn find_available_event(&self, event_id: &str, now: DateTime<Utc>) -> Result<Event> {
        let event = self
            .event_repo
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| EventError::EventNotFound(event_id.to_string()))?;

        EventValidator::validate_event_period(&event, now)?;
        EventValidator::check_active_event(&event)?;

        Ok(event)
    }

    async fn find_user_activity(&self, user_id: &str) -> Result<UserActivity> {
        self.activity_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| EventError::UserActivityNotFound(user_id.to_string()))
    }

    /// 用户在活动中所有 SUCCESS 请求的规则 ID
    async fn past_rule_ids(&self, event_id: &str, user_id: &str) -> Result<Vec<String>> {
        let previous = self
            .request_repo
            .find_previous_success(event_id, user_id)
            .await?;

        Ok(previous.into_iter().flat_map(|r| r.rule_ids).collect())
    }

    fn evaluate(
        &self,
        event: &Event,
        activity: &UserActivity,
        past_rule_ids: &[String],
        trace: bool,
    ) -> Result<EngineOutcome> {
        let started = Instant::now();

        let rule_set = self.rule_cache.get_or_build(event).map_err(|e| {
            warn!(event_id = %event.id, error = %e, "Failed to build rule set");
            EventError::from(e)
        })?;

        let mut engine = RewardEngine::new(&rule_set);
        if trace {
            engine = engine.with_trace();
        }
        let outcome = engine.run(&activity.to_metrics(), past_rule_ids);

        record_engine_evaluation(started.elapsed().as_secs_f64());
        Ok(outcome)
    }

    /// 加锁后重新读取请求并确认仍为 PENDING
    async fn lock_pending_request(
        &self,
        reward_request_id: &str,
    ) -> Result<(RewardRequest, KeyedLockGuard)> {
        let found = self.find_request(reward_request_id).await?;
        let guard = self
            .locks
            .acquire(&KeyedLock::reward_key(&found.user_id, &found.event_id))
            .await;

        let current = self.find_request(reward_request_id).await?;
        if !current.is_pending() {
            return Err(EventError::RewardRequestNotPending {
                id: current.id,
                current_status: current.status.to_string(),
            });
        }

        Ok((current, guard))
    }

    async fn find_request(&self, reward_request_id: &str) -> Result<RewardRequest> {
        self.request_repo
            .find_by_id(reward_request_id)
            .await?
            .ok_or_else(|| EventError::RewardRequestNotFound(reward_request_id.to_string()))
    }
}

fn build_reward_request(
    event_id: &str,
    user_id: &str,
    outcome: EngineOutcome,
    decision: StatusDecision,
    now: DateTime<Utc>,
) -> RewardRequest {
    let processed_at = match decision.status {
        RewardRequestStatus::Pending => None,
        _ => Some(now),
    };

    RewardRequest {
        id: Uuid::now_v7().to_string(),
        event_id: event_id.to_string(),
        user_id: user_id.to_string(),
        condition_met: decision.condition_met,
        rule_ids: outcome.new_achieved_rule_ids,
        rewards: outcome.rewards,
        status: decision.status,
        reason: None,
        requested_at: now,
        processed_at,
        approved_by: None,
        approved_at: None,
    }
}
