// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::Platform;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含Riot API、速率限制、工作池、爬取策略、数据库等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Riot API配置
    pub riot: RiotSettings,
    /// 速率限制配置
    pub rate_limit: RateLimitSettings,
    /// 工作池配置
    pub pool: PoolSettings,
    /// 爬取策略配置
    pub crawl: CrawlSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// HTTP客户端配置
    pub http: HttpSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// Riot API配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RiotSettings {
    /// API密钥（必填）
    pub api_key: Option<String>,
    /// 平台代码，如 EUW1、NA1、KR
    pub platform: String,
    /// 平台API基础地址覆盖（测试或代理时使用）
    pub platform_base_url: Option<String>,
    /// 区域API基础地址覆盖
    pub regional_base_url: Option<String>,
    /// Data Dragon静态数据基础地址
    pub ddragon_base_url: String,
}

/// 速率限制配置设置
///
/// 两个窗口独立计数，到期后整体重置
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// 短窗口内允许的请求数
    pub short_window_requests: u32,
    /// 短窗口长度（毫秒）
    pub short_window_ms: u64,
    /// 长窗口内允许的请求数
    pub long_window_requests: u32,
    /// 长窗口长度（毫秒）
    pub long_window_ms: u64,
}

impl RateLimitSettings {
    pub fn short_window(&self) -> Duration {
        Duration::from_millis(self.short_window_ms)
    }

    pub fn long_window(&self) -> Duration {
        Duration::from_millis(self.long_window_ms)
    }
}

/// 工作池配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSettings {
    /// 工作器数量，未设置时按种子玩家数计算
    pub workers: Option<usize>,
    /// 等待队列容量，超出部分直接丢弃
    pub queue_capacity: usize,
}

/// 爬取策略配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 需要收集对局的目标英雄名称（模糊匹配）
    pub target_champion: String,
    /// 目标游戏模式
    pub game_mode: String,
    /// 目标游戏类型
    pub game_type: String,
    /// 目标角色
    pub role: String,
    /// 目标分路
    pub lane: String,
    /// 从数据库读取的种子玩家上限
    pub seed_limit: u64,
    /// 每个玩家拉取的对局数量
    pub match_count: u32,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// HTTP客户端配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动Prometheus导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、配置文件和环境变量（前缀 `RANKCRAWL`，分隔符 `__`），
    /// 并兼容直接设置的 `RIOT_API_KEY` 环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("RANKCRAWL").separator("__"))
            .set_override_option("riot.api_key", std::env::var("RIOT_API_KEY").ok())?;

        builder.build()?.try_deserialize()
    }

    /// 仅包含默认值的配置构建器
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Riot API
            .set_default("riot.platform", "EUW1")?
            .set_default("riot.ddragon_base_url", "https://ddragon.leagueoflegends.com")?
            // Upstream development key limits: 20 req / 1s and 100 req / 1min
            .set_default("rate_limit.short_window_requests", 20)?
            .set_default("rate_limit.short_window_ms", 1_000)?
            .set_default("rate_limit.long_window_requests", 100)?
            .set_default("rate_limit.long_window_ms", 60_000)?
            // Pool
            .set_default("pool.queue_capacity", 200)?
            // Crawl strategy
            .set_default("crawl.target_champion", "Samira")?
            .set_default("crawl.game_mode", "CLASSIC")?
            .set_default("crawl.game_type", "MATCHED_GAME")?
            .set_default("crawl.role", "CARRY")?
            .set_default("crawl.lane", "BOTTOM")?
            .set_default("crawl.seed_limit", 200)?
            .set_default("crawl.match_count", 100)?
            // Database
            .set_default("database.url", "sqlite://rankcrawl.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // HTTP
            .set_default("http.timeout_secs", 10)?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 校验必填项和数值范围
    ///
    /// 缺少API密钥或限流参数为0时返回错误，调用方应在启动任何任务前退出
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key().is_none() {
            return Err(ConfigError::Message(
                "no riot api key set (RIOT_API_KEY or RANKCRAWL__RIOT__API_KEY)".to_string(),
            ));
        }

        let limits = &self.rate_limit;
        if limits.short_window_requests == 0
            || limits.long_window_requests == 0
            || limits.short_window_ms == 0
            || limits.long_window_ms == 0
        {
            return Err(ConfigError::Message(
                "rate limit windows and request counts must be greater than zero".to_string(),
            ));
        }

        if self.pool.queue_capacity == 0 {
            return Err(ConfigError::Message(
                "pool.queue_capacity must be greater than zero".to_string(),
            ));
        }

        self.platform()?;

        if self.pool.workers == Some(0) {
            return Err(ConfigError::Message(
                "pool.workers must be greater than zero when set".to_string(),
            ));
        }

        Ok(())
    }

    /// 解析配置的平台代码
    pub fn platform(&self) -> Result<Platform, ConfigError> {
        self.riot.platform.parse().map_err(ConfigError::Message)
    }

    /// 获取去除首尾空白后的API密钥，空字符串视为未设置
    pub fn api_key(&self) -> Option<&str> {
        self.riot
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
