//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集。
//! 只安装全局 recorder，不启动 HTTP 服务，需要时通过 handle 渲染。

use crate::error::{Result, SharedError};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    /// 渲染 Prometheus 文本格式
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 安装 Prometheus recorder 并注册指标描述
pub fn init(service_name: &str) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| SharedError::Observability(e.to_string()))?;

    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_reward_metrics(service_name);

    Ok(MetricsHandle { handle })
}

/// 注册奖励服务的指标描述
fn register_reward_metrics(service_name: &str) {
    metrics::describe_counter!(
        "reward_requests_total",
        "Total number of persisted reward requests by status"
    );
    metrics::describe_counter!(
        "reward_rules_granted_total",
        "Total number of newly achieved reward rules"
    );
    metrics::describe_histogram!(
        "reward_engine_evaluation_seconds",
        "Rule set build and engine evaluation duration in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录一条已持久化的奖励请求
#[inline]
pub fn record_reward_request(status: &str) {
    metrics::counter!("reward_requests_total", "status" => status.to_string()).increment(1);
}

/// 记录本次新达成的规则数
#[inline]
pub fn record_rules_granted(count: usize) {
    metrics::counter!("reward_rules_granted_total").increment(count as u64);
}

/// 记录引擎评估耗时
#[inline]
pub fn record_engine_evaluation(duration_secs: f64) {
    metrics::histogram!("reward_engine_evaluation_seconds").record(duration_secs);
}
