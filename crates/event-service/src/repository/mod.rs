//! 仓储层
//!
//! 服务层依赖 `traits` 中的抽象接口，`memory` 提供基于 DashMap 的实现。

mod memory;
mod traits;

pub use memory::{
    InMemoryEventRepository, InMemoryRewardRequestRepository, InMemoryUserActivityRepository,
};
pub use traits::{
    EventRepositoryTrait, RewardRequestFilter, RewardRequestRepositoryTrait,
    UserActivityRepositoryTrait,
};

#[cfg(test)]
pub use traits::{
    MockEventRepositoryTrait, MockRewardRequestRepositoryTrait, MockUserActivityRepositoryTrait,
};
