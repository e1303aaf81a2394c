// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use rankcrawl::domain::models::{MatchData, Player};
use rankcrawl::domain::repositories::match_repository::{MatchRepository, RepositoryError};
use rankcrawl::domain::services::{CrawlFilter, CrawlService};
use rankcrawl::engines::fetcher::RateLimitedFetcher;
use rankcrawl::engines::rate_limiter::RateLimiter;
use rankcrawl::engines::traits::{EngineError, HttpTransport, RawResponse};
use rankcrawl::infrastructure::riot::Endpoints;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const BASE_URL: &str = "http://riot.test";
pub const TARGET_CHAMPION: i64 = 360;

pub fn endpoints() -> Endpoints {
    Endpoints::with_base(BASE_URL, 100)
}

/// 按URL返回预设响应的传输，记录每个URL的调用次数
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, (u16, Bytes)>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, url: impl Into<String>, status: u16, body: Value) {
        self.routes
            .lock()
            .insert(url.into(), (status, Bytes::from(body.to_string())));
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, EngineError> {
        *self.calls.lock().entry(url.to_string()).or_default() += 1;
        // let other workers interleave
        tokio::task::yield_now().await;

        match self.routes.lock().get(url) {
            Some((status, body)) => Ok(RawResponse::new(*status, body.clone())),
            None => Ok(RawResponse::new(404, "not found")),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// 内存对局仓库，按游戏编号去重
#[derive(Default)]
pub struct InMemoryMatchRepository {
    pub saved: Mutex<Vec<MatchData>>,
    pub save_calls: Mutex<usize>,
    pub players: Mutex<Vec<Player>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_players(names: &[&str]) -> Arc<Self> {
        let repo = Self::default();
        *repo.players.lock() = names
            .iter()
            .map(|name| Player {
                summoner_id: format!("id-{}", name),
                summoner_name: name.to_string(),
                ..Default::default()
            })
            .collect();
        Arc::new(repo)
    }

    pub fn save_calls(&self) -> usize {
        *self.save_calls.lock()
    }

    pub fn saved_ids(&self) -> Vec<i64> {
        self.saved.lock().iter().map(|m| m.info.game_id).collect()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn save_match(&self, match_data: &MatchData) -> Result<(), RepositoryError> {
        *self.save_calls.lock() += 1;
        let mut saved = self.saved.lock();
        if !saved.iter().any(|m| m.info.game_id == match_data.info.game_id) {
            saved.push(match_data.clone());
        }
        Ok(())
    }

    async fn latest_crawled_players(&self, limit: u64) -> Result<Vec<Player>, RepositoryError> {
        Ok(self
            .players
            .lock()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn player_names_except(&self, names: &[String]) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .players
            .lock()
            .iter()
            .map(|p| p.summoner_name.clone())
            .filter(|name| !names.contains(name))
            .collect())
    }
}

pub fn fetcher(transport: Arc<StubTransport>) -> Arc<RateLimitedFetcher> {
    let limiter = Arc::new(RateLimiter::new(
        1_000,
        Duration::from_secs(1),
        10_000,
        Duration::from_secs(60),
    ));
    Arc::new(RateLimitedFetcher::new(
        transport,
        limiter,
        CancellationToken::new(),
    ))
}

pub fn filter() -> CrawlFilter {
    CrawlFilter {
        game_mode: "CLASSIC".to_string(),
        game_type: "MATCHED_GAME".to_string(),
        role: "CARRY".to_string(),
        lane: "BOTTOM".to_string(),
        champion_id: TARGET_CHAMPION,
    }
}

pub fn crawl_service(
    transport: Arc<StubTransport>,
    repository: Arc<InMemoryMatchRepository>,
) -> Arc<CrawlService> {
    Arc::new(CrawlService::new(
        fetcher(transport),
        endpoints(),
        repository,
        filter(),
    ))
}

/// 参与者JSON，默认处于目标角色和分路
pub fn participant(name: &str, champion_id: i64) -> Value {
    participant_at(name, champion_id, "CARRY", "BOTTOM")
}

pub fn participant_at(name: &str, champion_id: i64, role: &str, lane: &str) -> Value {
    json!({
        "summonerId": format!("id-{}", name),
        "summonerName": name,
        "summonerLevel": 30,
        "championId": champion_id,
        "role": role,
        "lane": lane,
        "participantId": 1,
    })
}

pub fn match_json(game_id: i64, game_mode: &str, participants: Vec<Value>) -> Value {
    json!({
        "metadata": {"matchId": format!("EUW1_{}", game_id)},
        "info": {
            "gameId": game_id,
            "gameMode": game_mode,
            "gameType": "MATCHED_GAME",
            "queueId": 420,
            "participants": participants,
        }
    })
}

pub fn profile_json(name: &str) -> Value {
    json!({
        "id": format!("id-{}", name),
        "accountId": format!("acc-{}", name),
        "puuid": format!("puuid-{}", name),
        "name": name,
        "profileIconId": 1,
        "revisionDate": 0,
        "summonerLevel": 30,
    })
}

/// 为玩家登记资料和对局列表
pub fn route_player(transport: &StubTransport, name: &str, match_ids: &[&str]) {
    let endpoints = endpoints();
    transport.route(endpoints.summoner_by_name(name), 200, profile_json(name));
    transport.route(
        endpoints.match_ids(&format!("puuid-{}", name)),
        200,
        json!(match_ids),
    );
}

pub fn route_match(transport: &StubTransport, game_id: i64, body: Value) {
    transport.route(endpoints().match_detail(&format!("EUW1_{}", game_id)), 200, body);
}

pub fn seed(name: &str) -> Player {
    Player {
        summoner_id: format!("id-{}", name),
        summoner_name: name.to_string(),
        ..Default::default()
    }
}
