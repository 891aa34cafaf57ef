//! 活动管理服务
//!
//! 活动的创建、状态切换与查询。

use std::sync::Arc;

use chrono::Utc;
use reward_shared::RewardConfig;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{EventError, Result};
use crate::models::Event;
use crate::repository::EventRepositoryTrait;
use crate::rule_cache::RuleSetCache;
use crate::service::dto::{CreateEventRequest, EventQuery, Paginated, UpdateEventStatusRequest};
use crate::validator::EventValidator;

pub struct EventService<E: EventRepositoryTrait> {
    event_repo: Arc<E>,
    rule_cache: Arc<RuleSetCache>,
    config: RewardConfig,
}

impl<E: EventRepositoryTrait> EventService<E> {
    pub fn new(event_repo: Arc<E>, rule_cache: Arc<RuleSetCache>, config: RewardConfig) -> Self {
        Self {
            event_repo,
            rule_cache,
            config,
        }
    }

    /// 创建活动
    ///
    /// 初始状态由当前时间是否落在时间窗口内决定，新活动没有奖励规则。
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        request.validate()?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(EventError::Validation("活动名称不能为空".to_string()));
        }
        EventValidator::validate_event_window(request.started_at, request.ended_at)?;

        let status =
            EventValidator::initial_status(request.started_at, request.ended_at, Utc::now());
        let event = Event {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            started_at: request.started_at,
            ended_at: request.ended_at,
            status,
            auto_reward: request.auto_reward,
            reward_rules: Vec::new(),
            version: 0,
        };

        self.event_repo.create(&event).await?;

        info!(
            event_id = %event.id,
            status = %event.status,
            auto_reward = event.auto_reward,
            "Event created"
        );

        Ok(event)
    }

    /// 切换活动状态，状态未变化时原样返回
    ///
    /// 停用的活动不再接受发放请求，同时移除其缓存的规则集。
    #[instrument(skip(self, request), fields(event_id = %request.event_id, status = %request.status))]
    pub async fn update_event_status(&self, request: UpdateEventStatusRequest) -> Result<Event> {
        request.validate()?;

        let status = EventValidator::parse_event_status(&request.status)?;
        let event = self.find_event(&request.event_id).await?;

        if event.status == status {
            return Ok(event);
        }

        let updated = self
            .event_repo
            .update_status(&event.id, status)
            .await?
            .ok_or_else(|| EventError::EventNotFound(event.id.clone()))?;

        if !updated.is_active() {
            self.rule_cache.invalidate(&updated.id);
        }

        info!(from = %event.status, to = %updated.status, "Event status changed");

        Ok(updated)
    }

    pub async fn find_event(&self, event_id: &str) -> Result<Event> {
        self.event_repo
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| EventError::EventNotFound(event_id.to_string()))
    }

    /// 分页查询活动，按开始时间倒序
    pub async fn list_events(&self, query: EventQuery) -> Result<Paginated<Event>> {
        query.validate()?;

        let page = query.page.unwrap_or(1);
        let page_size = self.config.clamp_page_size(query.page_size);

        let mut events = self.event_repo.list(query.active_only).await?;
        events.sort_by(|a, b| b.started_at.cmp(&a.started_at).then_with(|| a.id.cmp(&b.id)));

        let total = events.len() as u64;
        let data = events
            .into_iter()
            .skip((page as usize - 1) * page_size as usize)
            .take(page_size as usize)
            .collect();

        Ok(Paginated {
            data,
            total,
            page,
            page_size,
        })
    }
}
