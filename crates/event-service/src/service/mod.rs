//! 业务服务层
//!
//! 服务依赖仓储 Trait，通过泛型注入具体实现。

pub mod dto;
mod event_service;
mod reward_request_service;
mod reward_service;
mod user_activity_service;

pub use event_service::EventService;
pub use reward_request_service::RewardRequestService;
pub use reward_service::RewardService;
pub use user_activity_service::UserActivityService;
