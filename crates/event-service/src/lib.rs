//! 活动奖励服务
//!
//! 围绕奖励引擎组织活动、用户活跃数据与奖励发放请求的业务流程。
//!
//! ## 核心功能
//!
//! - **奖励发放请求**：解析活动与用户活跃数据，运行奖励引擎，按自动/人工策略落库
//! - **人工审核**：运营人员审批或驳回待处理的发放请求
//! - **奖励规则管理**：向已有规则追加奖励项，或新建经过校验的规则
//! - **活动管理**：创建活动、切换活动状态、查询活动
//! - **用户活跃数据**：写入用户活跃快照
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 仓储接口与内存实现
//! - `service`: 业务服务层
//! - `lock`: 按 (用户, 活动) 串行化的进程内锁
//! - `rule_cache`: 按活动版本缓存构建好的规则集
//! - `validator`: 活动时间窗口与状态校验

pub mod error;
pub mod lock;
pub mod models;
pub mod repository;
pub mod rule_cache;
pub mod service;
pub mod validator;

pub use error::{EventError, Result};
pub use models::{Event, EventStatus, RewardRequest, UserActivity};
pub use rule_cache::RuleSetCache;
pub use service::{
    EventService, RewardRequestService, RewardService, UserActivityService,
};
