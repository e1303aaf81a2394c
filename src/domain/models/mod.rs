// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 平台（platform）：服务器平台与区域路由
/// - 玩家（player）：爬取的基本单位
/// - 对局（game）：对局详情接口的数据结构
/// - 静态数据（static_data）：英雄和装备目录
pub mod game;
pub mod platform;
pub mod player;
pub mod static_data;

pub use game::{MatchData, Participant};
pub use platform::Platform;
pub use player::{Player, SummonerProfile};
pub use static_data::{ChampionStats, ItemData};
