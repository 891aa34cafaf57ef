//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Event, EventStatus, RewardItem, RewardRequest, RewardRequestStatus, RuleSpec, UserActivity,
};

/// 活动仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepositoryTrait: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Event>>;
    async fn list(&self, active_only: bool) -> Result<Vec<Event>>;

    /// 新建活动，名称重复时返回 `DuplicatedEvent`
    async fn create(&self, event: &Event) -> Result<()>;
    async fn update_status(&self, id: &str, status: EventStatus) -> Result<Option<Event>>;

    /// 原子地向指定规则追加奖励项并递增版本
    ///
    /// 活动或规则不存在时返回 `None`
    async fn push_reward_item(
        &self,
        event_id: &str,
        rule_id: &str,
        item: &RewardItem,
    ) -> Result<Option<Event>>;

    /// 原子地追加一条规则并递增版本，活动不存在时返回 `None`
    async fn push_rule(&self, event_id: &str, rule: &RuleSpec) -> Result<Option<Event>>;
}

/// 用户活跃数据仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserActivityRepositoryTrait: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserActivity>>;

    /// 创建或整体替换用户的活跃快照
    async fn upsert(&self, activity: &UserActivity) -> Result<UserActivity>;
}

/// 发放请求查询条件，字段为空表示不过滤
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardRequestFilter {
    pub event_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<RewardRequestStatus>,
}

impl RewardRequestFilter {
    pub fn matches(&self, request: &RewardRequest) -> bool {
        self.event_id.as_ref().is_none_or(|id| *id == request.event_id)
            && self.user_id.as_ref().is_none_or(|id| *id == request.user_id)
            && self.status.is_none_or(|s| s == request.status)
    }
}

/// 奖励发放请求仓储接口
///
/// `create` 与 `update` 必须保证 SUCCESS 请求之间 (user_id, event_id, rule_id) 唯一，
/// 冲突时返回 `RewardAlreadyClaimed`。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardRequestRepositoryTrait: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<RewardRequest>>;

    /// 查询用户在活动中的所有 SUCCESS 请求
    async fn find_previous_success(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> Result<Vec<RewardRequest>>;

    async fn create(&self, request: &RewardRequest) -> Result<()>;
    async fn update(&self, request: &RewardRequest) -> Result<()>;

    /// 按 requested_at 倒序分页查询
    async fn find_all(
        &self,
        filter: &RewardRequestFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RewardRequest>>;
    async fn count(&self, filter: &RewardRequestFilter) -> Result<u64>;
}
