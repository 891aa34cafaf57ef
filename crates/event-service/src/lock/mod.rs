//! 进程内锁模块
//!
//! 同一 (用户, 活动) 的发放与审批操作串行执行，
//! 配合仓储层的唯一性约束防止同一规则被重复发放。

mod keyed_lock;

pub use keyed_lock::{KeyedLock, KeyedLockGuard};
