//! 活动校验
//!
//! 活动时间窗口与生命周期状态的检查，供活动创建与发放流程共用。

use chrono::{DateTime, Utc};

use crate::error::{EventError, Result};
use crate::models::{Event, EventStatus};

pub struct EventValidator;

impl EventValidator {
    /// 开始时间必须早于结束时间
    pub fn validate_event_window(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Result<()> {
        if started_at >= ended_at {
            return Err(EventError::InvalidEventPeriod(format!(
                "开始时间 {} 不早于结束时间 {}",
                started_at, ended_at
            )));
        }
        Ok(())
    }

    /// 时间窗口合法且包含 `now`
    pub fn validate_event_period(event: &Event, now: DateTime<Utc>) -> Result<()> {
        Self::validate_event_window(event.started_at, event.ended_at)?;

        if !event.is_within_period(now) {
            return Err(EventError::InvalidEventPeriod(format!(
                "当前时间 {} 不在活动 {} 的时间窗口 [{}, {}] 内",
                now, event.id, event.started_at, event.ended_at
            )));
        }
        Ok(())
    }

    pub fn check_active_event(event: &Event) -> Result<()> {
        if event.status != EventStatus::Active {
            return Err(EventError::EventInactive(event.id.clone()));
        }
        Ok(())
    }

    pub fn parse_event_status(status: &str) -> Result<EventStatus> {
        status.parse()
    }

    /// 根据时间窗口决定新建活动的初始状态
    pub fn initial_status(
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> EventStatus {
        if started_at <= now && now <= ended_at {
            EventStatus::Active
        } else {
            EventStatus::Inactive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(start_offset_days: i64, end_offset_days: i64, status: EventStatus) -> Event {
        let now = Utc::now();
        Event {
            id: "e1".to_string(),
            name: "summer".to_string(),
            started_at: now + Duration::days(start_offset_days),
            ended_at: now + Duration::days(end_offset_days),
            status,
            auto_reward: true,
            reward_rules: vec![],
            version: 0,
        }
    }

    #[test]
    fn test_validate_event_window() {
        let now = Utc::now();
        assert!(EventValidator::validate_event_window(now, now + Duration::hours(1)).is_ok());

        let err = EventValidator::validate_event_window(now, now).unwrap_err();
        assert_eq!(err.error_code(), "EVENT_0003");
    }

    #[test]
    fn test_validate_event_period() {
        let now = Utc::now();
        assert!(EventValidator::validate_event_period(&event(-1, 1, EventStatus::Active), now).is_ok());

        let not_started = EventValidator::validate_event_period(&event(1, 2, EventStatus::Active), now);
        assert!(matches!(not_started, Err(EventError::InvalidEventPeriod(_))));

        let ended = EventValidator::validate_event_period(&event(-2, -1, EventStatus::Active), now);
        assert!(matches!(ended, Err(EventError::InvalidEventPeriod(_))));

        let inverted = EventValidator::validate_event_period(&event(1, -1, EventStatus::Active), now);
        assert!(matches!(inverted, Err(EventError::InvalidEventPeriod(_))));
    }

    #[test]
    fn test_check_active_event() {
        assert!(EventValidator::check_active_event(&event(-1, 1, EventStatus::Active)).is_ok());

        let err = EventValidator::check_active_event(&event(-1, 1, EventStatus::Inactive)).unwrap_err();
        assert_eq!(err.error_code(), "EVENT_0017");
    }

    #[test]
    fn test_initial_status() {
        let now = Utc::now();
        assert_eq!(
            EventValidator::initial_status(now - Duration::hours(1), now + Duration::hours(1), now),
            EventStatus::Active
        );
        assert_eq!(
            EventValidator::initial_status(now + Duration::hours(1), now + Duration::hours(2), now),
            EventStatus::Inactive
        );
    }

    #[test]
    fn test_parse_event_status() {
        assert_eq!(EventValidator::parse_event_status("INACTIVE").unwrap(), EventStatus::Inactive);
        assert!(EventValidator::parse_event_status("PAUSED").is_err());
    }
}
