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

use crate::config::settings::CrawlSettings;
use crate::domain::models::game::MatchInfo;
use crate::domain::models::{MatchData, Participant, Player, SummonerProfile};
use crate::domain::repositories::match_repository::MatchRepository;
use crate::engines::fetcher::RateLimitedFetcher;
use crate::infrastructure::riot::Endpoints;
use crate::queue::Job;
use crate::utils::errors::CrawlError;
use crate::workers::Pool;
use dashmap::DashSet;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 已访问玩家集合
///
/// 以召唤师名称为键。`mark` 是单次原子操作，并发的两个任务中只有一个能标记成功。
#[derive(Debug, Default)]
pub struct VisitedPlayers {
    names: DashSet<String>,
}

impl VisitedPlayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记玩家为已访问
    ///
    /// # 返回值
    ///
    /// 本次调用完成标记返回true，之前已被标记返回false
    pub fn mark(&self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// 批量标记，用于跳过以前运行中已经爬取过的玩家
    pub fn flag_all<I>(&self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        for name in names {
            self.names.insert(name);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// 对局过滤条件
#[derive(Debug, Clone)]
pub struct CrawlFilter {
    pub game_mode: String,
    pub game_type: String,
    pub role: String,
    pub lane: String,
    /// 需要保存对局的目标英雄编号
    pub champion_id: i64,
}

impl CrawlFilter {
    pub fn from_settings(settings: &CrawlSettings, champion_id: i64) -> Self {
        Self {
            game_mode: settings.game_mode.clone(),
            game_type: settings.game_type.clone(),
            role: settings.role.clone(),
            lane: settings.lane.clone(),
            champion_id,
        }
    }

    /// 对局是否为目标模式和类型
    pub fn is_target_match(&self, info: &MatchInfo) -> bool {
        info.game_mode == self.game_mode && info.game_type == self.game_type
    }

    /// 参与者是否处于目标角色和分路
    pub fn is_target_position(&self, participant: &Participant) -> bool {
        participant.role == self.role && participant.lane == self.lane
    }

    pub fn is_target_champion(&self, participant: &Participant) -> bool {
        participant.champion_id == self.champion_id
    }
}

/// 爬取服务
///
/// 每个玩家的爬取是一个任务：补全资料、拉取对局列表、逐个拉取对局详情，
/// 保存目标英雄的对局，并把对局中的其他玩家作为新任务交回工作池。
pub struct CrawlService {
    fetcher: Arc<RateLimitedFetcher>,
    endpoints: Endpoints,
    repository: Arc<dyn MatchRepository>,
    visited: VisitedPlayers,
    filter: CrawlFilter,
}

impl CrawlService {
    /// 创建新的爬取服务实例
    ///
    /// # 参数
    ///
    /// * `fetcher` - 限流请求器
    /// * `endpoints` - 接口地址构造器
    /// * `repository` - 对局仓库
    /// * `filter` - 对局过滤条件
    pub fn new(
        fetcher: Arc<RateLimitedFetcher>,
        endpoints: Endpoints,
        repository: Arc<dyn MatchRepository>,
        filter: CrawlFilter,
    ) -> Self {
        Self {
            fetcher,
            endpoints,
            repository,
            visited: VisitedPlayers::new(),
            filter,
        }
    }

    pub fn visited(&self) -> &VisitedPlayers {
        &self.visited
    }

    pub fn filter(&self) -> &CrawlFilter {
        &self.filter
    }

    /// 选择种子玩家
    ///
    /// 数据库中已有玩家时，取最早记录的 `limit` 个作为种子，其余已知玩家全部标记为已访问；
    /// 否则使用第一页最高段位玩家。
    pub async fn seed_players(&self, limit: u64) -> Result<Vec<Player>, CrawlError> {
        let players = self.repository.latest_crawled_players(limit).await?;
        if players.is_empty() {
            info!("No crawled players yet, seeding from challenger league");
            return self.challenger_players().await;
        }

        let seeds: Vec<String> = players.iter().map(|p| p.summoner_name.clone()).collect();
        let known = self.repository.player_names_except(&seeds).await?;
        info!(
            "Resuming from {} stored players, {} already crawled",
            players.len(),
            known.len()
        );
        self.visited.flag_all(known);
        Ok(players)
    }

    /// 拉取第一页最高段位单双排玩家
    pub async fn challenger_players(&self) -> Result<Vec<Player>, CrawlError> {
        let body = self.fetcher.get(&self.endpoints.challenger_entries()).await?;
        let players: Vec<Player> = serde_json::from_slice(&body)?;
        info!("Found {} challenger players", players.len());
        Ok(players)
    }

    /// 补全玩家资料，获取稳定账号标识
    pub async fn fetch_profile(&self, player: &mut Player) -> Result<(), CrawlError> {
        let url = self.endpoints.summoner_by_name(&player.summoner_name);
        let body = self.fetcher.get(&url).await?;
        let profile: SummonerProfile = serde_json::from_slice(&body)?;
        player.merge_profile(profile);
        Ok(())
    }

    pub async fn match_ids(&self, player: &Player) -> Result<Vec<String>, CrawlError> {
        let body = self.fetcher.get(&self.endpoints.match_ids(&player.puuid)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn match_detail(&self, match_id: &str) -> Result<MatchData, CrawlError> {
        let body = self.fetcher.get(&self.endpoints.match_detail(match_id)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// 构造爬取某个玩家的任务
    pub fn crawl_job(self: &Arc<Self>, player: Player, pool: &Arc<Pool>) -> Job {
        let service = self.clone();
        let pool = pool.clone();
        Job::new(async move {
            service.crawl_player(player, &pool).await?;
            Ok(())
        })
    }

    /// 爬取一个玩家
    ///
    /// 已访问过的玩家直接返回。标记发生在任何网络请求之前，
    /// 因此请求失败的玩家不会被再次爬取。
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 爬取完成或玩家已访问
    /// * `Err(CrawlError)` - 任一请求、解析或保存失败，剩余步骤被放弃
    #[instrument(skip_all, fields(player = %player.summoner_name))]
    pub async fn crawl_player(
        self: &Arc<Self>,
        mut player: Player,
        pool: &Arc<Pool>,
    ) -> Result<(), CrawlError> {
        if !self.visited.mark(&player.summoner_name) {
            debug!("Player already crawled");
            return Ok(());
        }
        counter!("crawl_players_total").increment(1);

        if player.needs_profile() {
            self.fetch_profile(&mut player).await?;
            debug!("Retrieved additional data for player");
        }

        let match_ids = self.match_ids(&player).await?;
        info!("Found {} games", match_ids.len());

        for match_id in match_ids {
            let match_data = self.match_detail(&match_id).await?;
            if !self.filter.is_target_match(&match_data.info) {
                continue;
            }
            self.process_match(&player, &match_data, pool).await?;
        }
        Ok(())
    }

    /// 保存目标对局并分发同分路的其他玩家
    async fn process_match(
        self: &Arc<Self>,
        origin: &Player,
        match_data: &MatchData,
        pool: &Arc<Pool>,
    ) -> Result<(), CrawlError> {
        let mut saved = false;

        for participant in &match_data.info.participants {
            if !self.filter.is_target_position(participant) {
                continue;
            }

            if !saved && self.filter.is_target_champion(participant) {
                info!("Saving game {}", match_data.metadata.match_id);
                self.repository.save_match(match_data).await?;
                counter!("crawl_matches_saved_total").increment(1);
                saved = true;
            }

            if participant.summoner_id == origin.summoner_id
                || participant.summoner_name.is_empty()
                || self.visited.contains(&participant.summoner_name)
            {
                continue;
            }

            debug!("Dispatch for player {}", participant.summoner_name);
            pool.dispatch(self.crawl_job(Player::from_participant(participant), pool));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "crawl_service_test.rs"]
mod tests;
