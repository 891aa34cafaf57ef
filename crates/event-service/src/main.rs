//! 奖励评估命令行工具
//!
//! 从 JSON 文件读取活动定义与用户活跃快照，在内存仓储上执行一次完整的
//! 奖励发放流程，并将生成的发放请求以 JSON 输出到标准输出。
//!
//! ```text
//! reward-eval --event event.json --activity activity.json --past login-3,invite-1 --trace
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use uuid::Uuid;

use event_reward::{
    Event, RewardRequest, RewardRequestService, RuleSetCache, UserActivity,
    models::RewardRequestStatus,
    repository::{
        InMemoryEventRepository, InMemoryRewardRequestRepository, InMemoryUserActivityRepository,
        RewardRequestRepositoryTrait, UserActivityRepositoryTrait,
    },
    service::dto::CreateRewardRequest,
};
use reward_shared::{AppConfig, observability};

const SERVICE_NAME: &str = "reward-eval";

#[derive(Debug, Parser)]
#[command(name = SERVICE_NAME, about = "对单个用户执行一次活动奖励评估")]
struct Cli {
    /// 活动定义 JSON 文件（含 rewardRules）
    #[arg(long)]
    event: PathBuf,

    /// 用户活跃快照 JSON 文件
    #[arg(long)]
    activity: PathBuf,

    /// 已成功发放过的规则 ID，逗号分隔
    #[arg(long, value_delimiter = ',')]
    past: Vec<String>,

    /// 输出逐条规则的评估追踪（到标准错误）
    #[arg(long)]
    trace: bool,

    /// 结束前输出 Prometheus 指标快照（到标准错误）
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. 加载配置
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 2. 初始化日志与指标
    let guard = observability::init(SERVICE_NAME, &config.observability)?;
    info!(environment = %config.environment, "Configuration loaded");

    let event: Event = read_json(&cli.event)?;
    let activity: UserActivity = read_json(&cli.activity)?;
    let event_id = event.id.clone();
    let user_id = activity.user_id.clone();

    // 3. 准备内存仓储
    let event_repo = Arc::new(InMemoryEventRepository::new());
    let activity_repo = Arc::new(InMemoryUserActivityRepository::new());
    let request_repo = Arc::new(InMemoryRewardRequestRepository::new());

    event_repo.seed(event);
    activity_repo.upsert(&activity).await?;

    let past: Vec<String> = cli
        .past
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if !past.is_empty() {
        request_repo
            .create(&past_success_request(&event_id, &user_id, past))
            .await?;
    }

    let service = RewardRequestService::new(
        event_repo,
        activity_repo,
        request_repo,
        Arc::new(RuleSetCache::new(config.reward.rule_cache_enabled)),
        config.reward.clone(),
    );

    // 4. 评估追踪
    if cli.trace {
        let preview = service.preview_reward(&event_id, &user_id).await?;
        eprintln!("{}", serde_json::to_string_pretty(&preview.trace)?);
    }

    // 5. 执行发放流程
    let request = service
        .create_reward_request(&event_id, CreateRewardRequest::new(user_id))
        .await
        .with_context(|| format!("reward evaluation failed for event {}", event_id))?;

    println!("{}", serde_json::to_string_pretty(&request)?);

    if cli.metrics {
        match guard.render_metrics() {
            Some(text) => eprintln!("{}", text),
            None => warn!("Metrics recorder is disabled"),
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// 将历史已发放规则表示为一条 SUCCESS 请求
fn past_success_request(event_id: &str, user_id: &str, rule_ids: Vec<String>) -> RewardRequest {
    let now = Utc::now();
    RewardRequest {
        id: Uuid::now_v7().to_string(),
        event_id: event_id.to_string(),
        user_id: user_id.to_string(),
        condition_met: true,
        rule_ids,
        rewards: Vec::new(),
        status: RewardRequestStatus::Success,
        reason: None,
        requested_at: now,
        processed_at: Some(now),
        approved_by: None,
        approved_at: None,
    }
}
