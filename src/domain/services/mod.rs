// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - 爬取服务（crawl_service）：单个玩家的爬取任务和递归分发
/// - 静态数据服务（static_data_service）：英雄和装备目录
pub mod crawl_service;
pub mod static_data_service;

pub use crawl_service::{CrawlFilter, CrawlService, VisitedPlayers};
pub use static_data_service::{StaticData, StaticDataService};
