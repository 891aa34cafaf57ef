//! 用户活跃数据模型

use chrono::{DateTime, Utc};
use reward_engine::ActivityMetrics;
use serde::{Deserialize, Serialize};

pub const LOGIN_STREAK_METRIC: &str = "loginStreak";
pub const INVITE_COUNT_METRIC: &str = "inviteCount";
pub const PURCHASE_TOTAL_METRIC: &str = "purchaseTotal";

/// 用户活跃快照（累计值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub user_id: String,
    #[serde(default)]
    pub login_streak: u32,
    #[serde(default)]
    pub invite_count: u32,
    #[serde(default)]
    pub purchase_total: f64,
    #[serde(default = "Utc::now")]
    pub last_updated_at: DateTime<Utc>,
}

impl UserActivity {
    /// 转换为引擎使用的指标映射
    pub fn to_metrics(&self) -> ActivityMetrics {
        ActivityMetrics::new()
            .with(LOGIN_STREAK_METRIC, f64::from(self.login_streak))
            .with(INVITE_COUNT_METRIC, f64::from(self.invite_count))
            .with(PURCHASE_TOTAL_METRIC, self.purchase_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_metrics() {
        let activity = UserActivity {
            user_id: "u1".to_string(),
            login_streak: 3,
            invite_count: 1,
            purchase_total: 12.5,
            last_updated_at: Utc::now(),
        };

        let metrics = activity.to_metrics();
        assert_eq!(metrics.get("loginStreak"), 3.0);
        assert_eq!(metrics.get("inviteCount"), 1.0);
        assert_eq!(metrics.get("purchaseTotal"), 12.5);
        assert_eq!(metrics.len(), 3);
    }

    #[test]
    fn test_deserialize_partial() {
        let activity: UserActivity =
            serde_json::from_str(r#"{"userId": "u1", "loginStreak": 5}"#).unwrap();
        assert_eq!(activity.login_streak, 5);
        assert_eq!(activity.invite_count, 0);
        assert_eq!(activity.purchase_total, 0.0);
    }
}
