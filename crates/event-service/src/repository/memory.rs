//! 内存仓储
//!
//! 使用 DashMap 实现的高并发内存存储，适用于命令行工具、测试和开发环境。
//! 单条记录的读改写在 DashMap 分片锁内完成；发放请求的唯一性约束
//! 由一把独立的互斥锁保护。

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::traits::{
    EventRepositoryTrait, RewardRequestFilter, RewardRequestRepositoryTrait,
    UserActivityRepositoryTrait,
};
use crate::error::{EventError, Result};
use crate::models::{
    Event, EventStatus, RewardItem, RewardRequest, RuleSpec, UserActivity,
};

// ==================== 活动 ====================

#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: DashMap<String, Event>,
    /// 保证名称唯一检查与插入的原子性
    create_lock: Mutex<()>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入活动（用于初始化数据），不做名称唯一检查
    pub fn seed(&self, event: Event) {
        self.events.insert(event.id.clone(), event);
    }

    pub fn count(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl EventRepositoryTrait for InMemoryEventRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.events.get(id).map(|e| e.clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Event>> {
        Ok(self
            .events
            .iter()
            .find(|entry| entry.value().name == name)
            .map(|entry| entry.value().clone()))
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Event>> {
        Ok(self
            .events
            .iter()
            .filter(|entry| !active_only || entry.value().is_active())
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn create(&self, event: &Event) -> Result<()> {
        let _guard = self.create_lock.lock();

        if self.events.iter().any(|entry| entry.value().name == event.name) {
            return Err(EventError::DuplicatedEvent(event.name.clone()));
        }
        if self.events.contains_key(&event.id) {
            return Err(EventError::Internal(format!("活动 ID 冲突: {}", event.id)));
        }

        self.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn update_status(&self, id: &str, status: EventStatus) -> Result<Option<Event>> {
        Ok(self.events.get_mut(id).map(|mut event| {
            event.status = status;
            event.clone()
        }))
    }

    async fn push_reward_item(
        &self,
        event_id: &str,
        rule_id: &str,
        item: &RewardItem,
    ) -> Result<Option<Event>> {
        let Some(mut event) = self.events.get_mut(event_id) else {
            return Ok(None);
        };

        let Some(rule) = event.find_rule_mut(rule_id) else {
            return Ok(None);
        };
        rule.reward_items.push(item.clone());
        event.bump_version();

        Ok(Some(event.clone()))
    }

    async fn push_rule(&self, event_id: &str, rule: &RuleSpec) -> Result<Option<Event>> {
        Ok(self.events.get_mut(event_id).map(|mut event| {
            event.reward_rules.push(rule.clone());
            event.bump_version();
            event.clone()
        }))
    }
}

// ==================== 用户活跃数据 ====================

#[derive(Debug, Default)]
pub struct InMemoryUserActivityRepository {
    activities: DashMap<String, UserActivity>,
}

impl InMemoryUserActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserActivityRepositoryTrait for InMemoryUserActivityRepository {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserActivity>> {
        Ok(self.activities.get(user_id).map(|a| a.clone()))
    }

    async fn upsert(&self, activity: &UserActivity) -> Result<UserActivity> {
        self.activities
            .insert(activity.user_id.clone(), activity.clone());
        Ok(activity.clone())
    }
}

// ==================== 奖励发放请求 ====================

/// (user_id, event_id, rule_id)
type ClaimKey = (String, String, String);

#[derive(Debug, Default)]
pub struct InMemoryRewardRequestRepository {
    requests: DashMap<String, RewardRequest>,
    /// SUCCESS 请求占用的 (用户, 活动, 规则) -> 请求 ID
    claims: Mutex<HashMap<ClaimKey, String>>,
}

impl InMemoryRewardRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在唯一性约束保护下写入请求
    fn save(&self, request: &RewardRequest) -> Result<()> {
        let mut claims = self.claims.lock();

        if request.is_success() {
            let keys: Vec<ClaimKey> = request
                .rule_ids
                .iter()
                .map(|rule_id| {
                    (
                        request.user_id.clone(),
                        request.event_id.clone(),
                        rule_id.clone(),
                    )
                })
                .collect();

            if let Some((user_id, event_id, rule_id)) = keys
                .iter()
                .find(|key| claims.get(*key).is_some_and(|owner| *owner != request.id))
            {
                return Err(EventError::RewardAlreadyClaimed {
                    user_id: user_id.clone(),
                    event_id: event_id.clone(),
                    rule_id: rule_id.clone(),
                });
            }

            for key in keys {
                claims.insert(key, request.id.clone());
            }
        }

        self.requests.insert(request.id.clone(), request.clone());
        Ok(())
    }
}

#[async_trait]
impl RewardRequestRepositoryTrait for InMemoryRewardRequestRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<RewardRequest>> {
        Ok(self.requests.get(id).map(|r| r.clone()))
    }

    async fn find_previous_success(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> Result<Vec<RewardRequest>> {
        let mut requests: Vec<RewardRequest> = self
            .requests
            .iter()
            .filter(|entry| {
                let r = entry.value();
                r.is_success() && r.event_id == event_id && r.user_id == user_id
            })
            .map(|entry| entry.value().clone())
            .collect();
        requests.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(requests)
    }

    async fn create(&self, request: &RewardRequest) -> Result<()> {
        if self.requests.contains_key(&request.id) {
            return Err(EventError::Internal(format!(
                "发放请求 ID 冲突: {}",
                request.id
            )));
        }
        self.save(request)
    }

    async fn update(&self, request: &RewardRequest) -> Result<()> {
        if !self.requests.contains_key(&request.id) {
            return Err(EventError::RewardRequestNotFound(request.id.clone()));
        }
        self.save(request)
    }

    async fn find_all(
        &self,
        filter: &RewardRequestFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RewardRequest>> {
        let mut matched: Vec<RewardRequest> = self
            .requests
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matched.sort_by(|a, b| {
            b.requested_at
                .cmp(&a.requested_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &RewardRequestFilter) -> Result<u64> {
        Ok(self
            .requests
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count() as u64)
    }
}
