//! 用户活跃数据服务

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};
use validator::Validate;

use crate::error::{EventError, Result};
use crate::models::UserActivity;
use crate::repository::UserActivityRepositoryTrait;
use crate::service::dto::UserActivityUpsert;

pub struct UserActivityService<U: UserActivityRepositoryTrait> {
    activity_repo: Arc<U>,
}

impl<U: UserActivityRepositoryTrait> UserActivityService<U> {
    pub fn new(activity_repo: Arc<U>) -> Self {
        Self { activity_repo }
    }

    /// 写入用户活跃快照，整体替换旧值
    #[instrument(skip(self, upsert), fields(user_id = %upsert.user_id))]
    pub async fn record_activity(&self, upsert: UserActivityUpsert) -> Result<UserActivity> {
        upsert.validate()?;
        if !upsert.purchase_total.is_finite() {
            return Err(EventError::Validation("累计消费必须为有限数值".to_string()));
        }

        let activity = UserActivity {
            user_id: upsert.user_id,
            login_streak: upsert.login_streak,
            invite_count: upsert.invite_count,
            purchase_total: upsert.purchase_total,
            last_updated_at: Utc::now(),
        };

        let saved = self.activity_repo.upsert(&activity).await?;
        debug!(
            login_streak = saved.login_streak,
            invite_count = saved.invite_count,
            purchase_total = saved.purchase_total,
            "User activity recorded"
        );

        Ok(saved)
    }

    pub async fn find_activity(&self, user_id: &str) -> Result<UserActivity> {
        self.activity_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| EventError::UserActivityNotFound(user_id.to_string()))
    }
}
