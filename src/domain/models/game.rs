// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 对局详情
///
/// 对应对局详情接口的响应，只保留持久化和过滤需要的字段，未知字段忽略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchData {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchMetadata {
    pub match_id: String,
}

/// 对局信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchInfo {
    pub game_creation: i64,
    pub game_duration: i64,
    pub game_end_timestamp: i64,
    pub game_id: i64,
    pub game_mode: String,
    pub game_name: String,
    pub game_start_timestamp: i64,
    pub game_type: String,
    pub game_version: String,
    pub map_id: i32,
    pub participants: Vec<Participant>,
    pub platform_id: String,
    pub queue_id: i32,
}

/// 对局参与者
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub assists: i32,
    pub baron_kills: i32,
    pub bounty_level: i32,
    pub champ_level: i32,
    pub champion_id: i64,
    pub champion_name: String,
    pub damage_dealt_to_objectives: i64,
    pub deaths: i32,
    pub gold_earned: i32,
    pub gold_spent: i32,
    pub item0: i32,
    pub item1: i32,
    pub item2: i32,
    pub item3: i32,
    pub item4: i32,
    pub item5: i32,
    pub item6: i32,
    pub kills: i32,
    pub lane: String,
    pub participant_id: i32,
    pub perks: Perks,
    pub role: String,
    pub summoner1_id: i32,
    pub summoner2_id: i32,
    pub summoner_id: String,
    pub summoner_level: i64,
    pub summoner_name: String,
    pub team_id: i32,
    pub total_damage_dealt_to_champions: i64,
    pub win: bool,
}

impl Participant {
    /// 按槽位顺序返回装备，空槽位（0）不计入
    pub fn items(&self) -> Vec<(usize, i32)> {
        [
            self.item0, self.item1, self.item2, self.item3, self.item4, self.item5, self.item6,
        ]
        .into_iter()
        .enumerate()
        .filter(|(_, item)| *item != 0)
        .collect()
    }
}

/// 符文配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Perks {
    pub stat_perks: StatPerks,
    pub styles: Vec<PerkStyle>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatPerks {
    pub defense: i32,
    pub flex: i32,
    pub offense: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerkStyle {
    pub description: String,
    pub selections: Vec<PerkSelection>,
    pub style: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerkSelection {
    pub perk: i32,
    pub var1: i32,
    pub var2: i32,
    pub var3: i32,
}
