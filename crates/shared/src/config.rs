//! 配置管理模块
//!
//! 支持分层配置文件加载与环境变量覆盖，所有配置项都有默认值，
//! 缺少配置文件时服务仍可启动。

use crate::error::{Result, SharedError};
use crate::observability::ObservabilityConfig;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 奖励业务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// 分页查询未指定大小时的默认值
    pub default_page_size: u32,
    /// 分页大小上限
    pub max_page_size: u32,
    /// 是否按活动版本缓存构建好的规则集
    pub rule_cache_enabled: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            rule_cache_enabled: true,
        }
    }
}

impl RewardConfig {
    /// 将请求的分页大小限制在 `[1, max_page_size]`，未指定时使用默认值
    pub fn clamp_page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub observability: ObservabilityConfig,
    pub reward: RewardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "event-reward-service".to_string(),
            environment: "development".to_string(),
            observability: ObservabilityConfig::default(),
            reward: RewardConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（REWARD__ 前缀，如 REWARD__OBSERVABILITY__LOG_LEVEL -> observability.log_level）
    ///
    /// 环境由 `REWARD_ENV` 指定，配置目录由 `CONFIG_DIR` 指定。
    pub fn load(service_name: &str) -> Result<Self> {
        let env = std::env::var("REWARD_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(&config_dir, &env, service_name)
    }

    /// 从指定目录加载配置
    pub fn load_from(config_dir: impl AsRef<Path>, env: &str, service_name: &str) -> Result<Self> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("REWARD")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<()> {
        if self.reward.max_page_size == 0 {
            return Err(SharedError::InvalidConfig {
                field: "reward.max_page_size".to_string(),
                message: "必须大于 0".to_string(),
            });
        }
        if self.reward.default_page_size == 0
            || self.reward.default_page_size > self.reward.max_page_size
        {
            return Err(SharedError::InvalidConfig {
                field: "reward.default_page_size".to_string(),
                message: format!("必须在 1..={} 之间", self.reward.max_page_size),
            });
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
