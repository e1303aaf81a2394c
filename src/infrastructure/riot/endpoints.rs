// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{CrawlSettings, RiotSettings};
use crate::domain::models::Platform;
use config::ConfigError;

/// 排位队列
pub const RANKED_SOLO_5X5: &str = "RANKED_SOLO_5x5";
/// 最高段位
pub const CHALLENGER: &str = "CHALLENGER";
/// 段位内分级
pub const DIVISION_ONE: &str = "I";

/// 接口地址构造器
///
/// 只负责拼接URL，API密钥由传输层通过请求头发送，地址中不包含凭据，可以安全地写入日志
#[derive(Debug, Clone)]
pub struct Endpoints {
    platform_base: String,
    regional_base: String,
    ddragon_base: String,
    match_count: u32,
}

impl Endpoints {
    /// 按平台创建默认地址
    pub fn new(platform: Platform, ddragon_base: &str, match_count: u32) -> Self {
        Self {
            platform_base: format!("https://{}", platform.host()),
            regional_base: format!("https://{}", platform.regional_host()),
            ddragon_base: trim_base(ddragon_base),
            match_count,
        }
    }

    /// 根据配置创建，配置中的基础地址覆盖默认值
    ///
    /// # 返回值
    ///
    /// * `Ok(Endpoints)` - 地址构造器
    /// * `Err(ConfigError)` - 平台代码无法识别
    pub fn from_settings(riot: &RiotSettings, crawl: &CrawlSettings) -> Result<Self, ConfigError> {
        let platform: Platform = riot.platform.parse().map_err(ConfigError::Message)?;
        let mut endpoints = Self::new(platform, &riot.ddragon_base_url, crawl.match_count);

        if let Some(base) = &riot.platform_base_url {
            endpoints.platform_base = trim_base(base);
        }
        if let Some(base) = &riot.regional_base_url {
            endpoints.regional_base = trim_base(base);
        }
        Ok(endpoints)
    }

    /// 使用同一个基础地址访问所有接口，测试时指向本地服务
    pub fn with_base(base: &str, match_count: u32) -> Self {
        let base = trim_base(base);
        Self {
            platform_base: base.clone(),
            regional_base: base.clone(),
            ddragon_base: base,
            match_count,
        }
    }

    pub fn summoner_by_name(&self, name: &str) -> String {
        format!(
            "{}/lol/summoner/v4/summoners/by-name/{}",
            self.platform_base,
            urlencoding::encode(name)
        )
    }

    pub fn league_entries(&self, queue: &str, tier: &str, division: &str, page: u32) -> String {
        format!(
            "{}/lol/league-exp/v4/entries/{}/{}/{}?page={}",
            self.platform_base, queue, tier, division, page
        )
    }

    /// 第一页最高段位单双排玩家
    pub fn challenger_entries(&self) -> String {
        self.league_entries(RANKED_SOLO_5X5, CHALLENGER, DIVISION_ONE, 1)
    }

    pub fn match_ids(&self, puuid: &str) -> String {
        format!(
            "{}/lol/match/v5/matches/by-puuid/{}/ids?start=0&count={}",
            self.regional_base,
            urlencoding::encode(puuid),
            self.match_count
        )
    }

    pub fn match_detail(&self, match_id: &str) -> String {
        format!(
            "{}/lol/match/v5/matches/{}",
            self.regional_base,
            urlencoding::encode(match_id)
        )
    }

    pub fn versions(&self) -> String {
        format!("{}/api/versions.json", self.ddragon_base)
    }

    pub fn champions(&self, version: &str) -> String {
        format!("{}/cdn/{}/data/en_US/champion.json", self.ddragon_base, version)
    }

    pub fn items(&self, version: &str) -> String {
        format!("{}/cdn/{}/data/en_US/item.json", self.ddragon_base, version)
    }
}

fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "endpoints_test.rs"]
mod tests;
