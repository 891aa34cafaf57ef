//! 按键串行化的异步锁

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// 按键加锁
///
/// 不同键之间互不阻塞，同一键的持有者按获取顺序排队。
/// 最后一个持有者释放后条目即被移除，锁表只保留正在使用的键。
#[derive(Debug, Default)]
pub struct KeyedLock {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// 锁守卫，drop 时释放，无人等待时移除锁条目
#[derive(Debug)]
pub struct KeyedLockGuard {
    key: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedLockGuard {
    fn drop(&mut self) {
        // 先释放互斥锁，此后引用计数为 1 说明只剩锁表自身持有
        self.guard.take();
        let removed = self
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1)
            .is_some();
        debug!(key = %self.key, removed, "Keyed lock released");
    }
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 奖励发放使用的锁键
    pub fn reward_key(user_id: &str, event_id: &str) -> String {
        format!("reward:{}:{}", user_id, event_id)
    }

    /// 获取锁，必要时等待
    pub async fn acquire(&self, key: &str) -> KeyedLockGuard {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;
        debug!(key = %key, active_keys = self.locks.len(), "Keyed lock acquired");

        KeyedLockGuard {
            key: key.to_string(),
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// 当前存在的锁条目数（持有中或有等待者）
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
