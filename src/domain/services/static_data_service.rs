// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::static_data::{ChampionsResponse, ItemsResponse};
use crate::domain::models::{ChampionStats, ItemData};
use crate::engines::fetcher::RateLimitedFetcher;
use crate::infrastructure::riot::Endpoints;
use crate::utils::errors::CrawlError;
use crate::utils::similarity::string_similarity;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// 名称足够接近，可视为同一个英雄
pub const STRONG_SIMILARITY: f64 = 70.0;
/// 名称可能相关
pub const WEAK_SIMILARITY: f64 = 50.0;

/// 静态游戏数据
///
/// 某个数据版本下的英雄和装备目录
#[derive(Debug, Clone, Default)]
pub struct StaticData {
    pub version: String,
    pub champions: HashMap<String, ChampionStats>,
    pub items: HashMap<String, ItemData>,
}

impl StaticData {
    /// 按名称模糊查找英雄
    ///
    /// 同时比较目录键和展示名称，忽略大小写，返回相似度不低于70的最佳匹配
    pub fn champion(&self, name: &str) -> Option<&ChampionStats> {
        self.scored(name)
            .filter(|(score, _)| *score >= STRONG_SIMILARITY)
            .max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.id.cmp(&a.1.id)))
            .map(|(_, champion)| champion)
    }

    /// 返回所有相似度不低于50的英雄，按相似度从高到低排列
    pub fn champions_like(&self, name: &str) -> Vec<&ChampionStats> {
        let mut matches: Vec<_> = self
            .scored(name)
            .filter(|(score, _)| *score >= WEAK_SIMILARITY)
            .collect();
        matches.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
        matches.into_iter().map(|(_, champion)| champion).collect()
    }

    /// 解析目标英雄在对局数据中的数字编号
    ///
    /// # 返回值
    ///
    /// * `Ok(i64)` - 英雄编号
    /// * `Err(CrawlError::ChampionNotFound)` - 找不到英雄或编号不是数字
    pub fn target_champion_key(&self, name: &str) -> Result<i64, CrawlError> {
        self.champion(name)
            .and_then(|champion| champion.key.parse().ok())
            .ok_or_else(|| CrawlError::ChampionNotFound(name.to_string()))
    }

    fn scored<'a>(&'a self, name: &str) -> impl Iterator<Item = (f64, &'a ChampionStats)> + 'a {
        let needle = name.to_lowercase();
        self.champions.iter().map(move |(key, champion)| {
            let by_key = string_similarity(&key.to_lowercase(), &needle);
            let by_name = string_similarity(&champion.name.to_lowercase(), &needle);
            (by_key.max(by_name), champion)
        })
    }
}

/// 静态数据服务
///
/// 通过限流请求器下载最新版本的英雄和装备目录
pub struct StaticDataService {
    fetcher: Arc<RateLimitedFetcher>,
    endpoints: Endpoints,
}

impl StaticDataService {
    pub fn new(fetcher: Arc<RateLimitedFetcher>, endpoints: Endpoints) -> Self {
        Self { fetcher, endpoints }
    }

    /// 获取最新的数据版本（版本列表的第一项）
    pub async fn latest_version(&self) -> Result<String, CrawlError> {
        let body = self.fetcher.get(&self.endpoints.versions()).await?;
        let versions: Vec<String> = serde_json::from_slice(&body)?;
        versions.into_iter().next().ok_or(CrawlError::EmptyVersionList)
    }

    pub async fn champions(&self, version: &str) -> Result<HashMap<String, ChampionStats>, CrawlError> {
        let body = self.fetcher.get(&self.endpoints.champions(version)).await?;
        let response: ChampionsResponse = serde_json::from_slice(&body)?;
        info!("{} champions found", response.data.len());
        Ok(response.data)
    }

    pub async fn items(&self, version: &str) -> Result<HashMap<String, ItemData>, CrawlError> {
        let body = self.fetcher.get(&self.endpoints.items(version)).await?;
        let response: ItemsResponse = serde_json::from_slice(&body)?;
        info!("{} items found", response.data.len());
        Ok(response.data)
    }

    /// 依次加载版本、英雄目录和装备目录
    pub async fn load(&self) -> Result<StaticData, CrawlError> {
        let version = self.latest_version().await?;
        info!("Using static data version {}", version);
        let champions = self.champions(&version).await?;
        let items = self.items(&version).await?;
        Ok(StaticData {
            version,
            champions,
            items,
        })
    }
}

#[cfg(test)]
#[path = "static_data_service_test.rs"]
mod tests;
