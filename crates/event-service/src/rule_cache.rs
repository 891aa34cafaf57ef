//! 规则集缓存
//!
//! 按活动 ID 缓存构建好的规则集，并记录构建时的活动版本。
//! 活动规则变更会递增版本，版本不一致时重新构建。

use std::sync::Arc;

use dashmap::DashMap;
use reward_engine::{RuleError, RuleSet};
use tracing::debug;

use crate::models::Event;

#[derive(Debug, Clone)]
struct CachedRuleSet {
    version: u64,
    rule_set: Arc<RuleSet>,
}

/// 规则集缓存
#[derive(Debug)]
pub struct RuleSetCache {
    enabled: bool,
    entries: DashMap<String, CachedRuleSet>,
}

impl Default for RuleSetCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RuleSetCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: DashMap::new(),
        }
    }

    /// 获取活动当前版本的规则集，未命中时构建并缓存
    ///
    /// 构建失败不写入缓存。
    pub fn get_or_build(&self, event: &Event) -> Result<Arc<RuleSet>, RuleError> {
        if self.enabled
            && let Some(cached) = self.entries.get(&event.id)
            && cached.version == event.version
        {
            return Ok(Arc::clone(&cached.rule_set));
        }

        let rule_set = Arc::new(RuleSet::build(&event.reward_rules)?);
        debug!(
            event_id = %event.id,
            version = event.version,
            rules = rule_set.len(),
            "Rule set built"
        );

        if self.enabled {
            self.entries.insert(
                event.id.clone(),
                CachedRuleSet {
                    version: event.version,
                    rule_set: Arc::clone(&rule_set),
                },
            );
        }

        Ok(rule_set)
    }

    /// 移除活动的缓存规则集，活动停用时调用
    pub fn invalidate(&self, event_id: &str) {
        self.entries.remove(event_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
