//! 领域模型

mod enums;
mod event;
mod reward_request;
mod user_activity;

pub use enums::EventStatus;
pub use event::Event;
pub use reward_request::RewardRequest;
pub use user_activity::{
    INVITE_COUNT_METRIC, LOGIN_STREAK_METRIC, PURCHASE_TOTAL_METRIC, UserActivity,
};

pub use reward_engine::{RewardItem, RewardRequestStatus, RewardType, RuleSpec};
