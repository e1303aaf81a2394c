// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 英雄静态数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChampionStats {
    pub id: String,
    /// 数字形式的英雄编号，对局数据中的 `championId` 与之对应
    pub key: String,
    pub name: String,
    pub title: String,
    pub tags: Vec<String>,
    pub partype: String,
}

/// 装备静态数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemData {
    pub name: String,
    pub description: String,
    pub colloq: String,
    pub plaintext: String,
    pub into: Vec<String>,
    pub gold: ItemGold,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemGold {
    pub base: i32,
    pub purchasable: bool,
    pub total: i32,
    pub sell: i32,
}

/// 英雄目录响应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChampionsResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub data: HashMap<String, ChampionStats>,
}

/// 装备目录响应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemsResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub data: HashMap<String, ItemData>,
}
