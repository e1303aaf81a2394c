// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::game::Participant;
use serde::{Deserialize, Serialize};

/// 玩家
///
/// 既可以由排位联赛条目解析得到，也可以从对局参与者构造出只含基本信息的存根。
/// `puuid` 为空表示还需要补充召唤师资料。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Player {
    pub summoner_id: String,
    pub summoner_name: String,
    pub summoner_level: i64,
    pub league_points: i64,
    pub wins: i64,
    pub losses: i64,
    pub account_id: String,
    pub puuid: String,
    pub profile_icon_id: i64,
    pub revision_date: i64,
}

impl Player {
    /// 从对局参与者构造玩家存根
    pub fn from_participant(participant: &Participant) -> Self {
        Self {
            summoner_id: participant.summoner_id.clone(),
            summoner_name: participant.summoner_name.clone(),
            summoner_level: participant.summoner_level,
            ..Default::default()
        }
    }

    /// 是否缺少稳定账号标识
    pub fn needs_profile(&self) -> bool {
        self.puuid.is_empty()
    }

    /// 合并召唤师资料接口返回的数据
    pub fn merge_profile(&mut self, profile: SummonerProfile) {
        if !profile.id.is_empty() {
            self.summoner_id = profile.id;
        }
        if !profile.name.is_empty() {
            self.summoner_name = profile.name;
        }
        self.account_id = profile.account_id;
        self.puuid = profile.puuid;
        self.profile_icon_id = profile.profile_icon_id;
        self.revision_date = profile.revision_date;
        self.summoner_level = profile.summoner_level;
    }
}

/// 召唤师资料接口的响应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummonerProfile {
    pub id: String,
    pub account_id: String,
    pub puuid: String,
    pub name: String,
    pub profile_icon_id: i64,
    pub revision_date: i64,
    pub summoner_level: i64,
}
