// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 游戏服务器平台
///
/// 召唤师和排位接口按平台路由，对局接口按平台所属的区域路由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    Br1,
    Eun1,
    Euw1,
    Jp1,
    Kr,
    La1,
    La2,
    Na1,
    Oc1,
    Tr1,
    Ru,
    Ph2,
    Sg2,
    Th2,
    Tw2,
    Vn2,
}

impl Platform {
    pub const ALL: [Platform; 16] = [
        Platform::Br1,
        Platform::Eun1,
        Platform::Euw1,
        Platform::Jp1,
        Platform::Kr,
        Platform::La1,
        Platform::La2,
        Platform::Na1,
        Platform::Oc1,
        Platform::Tr1,
        Platform::Ru,
        Platform::Ph2,
        Platform::Sg2,
        Platform::Th2,
        Platform::Tw2,
        Platform::Vn2,
    ];

    /// 平台代码，如 `EUW1`
    pub fn code(&self) -> &'static str {
        match self {
            Platform::Br1 => "BR1",
            Platform::Eun1 => "EUN1",
            Platform::Euw1 => "EUW1",
            Platform::Jp1 => "JP1",
            Platform::Kr => "KR",
            Platform::La1 => "LA1",
            Platform::La2 => "LA2",
            Platform::Na1 => "NA1",
            Platform::Oc1 => "OC1",
            Platform::Tr1 => "TR1",
            Platform::Ru => "RU",
            Platform::Ph2 => "PH2",
            Platform::Sg2 => "SG2",
            Platform::Th2 => "TH2",
            Platform::Tw2 => "TW2",
            Platform::Vn2 => "VN2",
        }
    }

    /// 平台接口主机名
    pub fn host(&self) -> String {
        format!("{}.api.riotgames.com", self.code().to_lowercase())
    }

    /// 区域路由名称
    pub fn region(&self) -> &'static str {
        match self {
            Platform::Br1 | Platform::La1 | Platform::La2 | Platform::Na1 => "americas",
            Platform::Eun1 | Platform::Euw1 | Platform::Tr1 | Platform::Ru => "europe",
            Platform::Jp1 | Platform::Kr => "asia",
            Platform::Oc1
            | Platform::Ph2
            | Platform::Sg2
            | Platform::Th2
            | Platform::Tw2
            | Platform::Vn2 => "sea",
        }
    }

    /// 区域接口主机名
    pub fn regional_host(&self) -> String {
        format!("{}.api.riotgames.com", self.region())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| format!("Unknown platform: {}", s))
    }
}
