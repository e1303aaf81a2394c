// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{MatchData, Player};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// 对局仓库特质
///
/// 定义对局和召唤师的持久化接口，具体实现由基础设施层提供
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// 保存对局及其参与者
    ///
    /// 重复保存同一对局不会报错
    ///
    /// # 参数
    ///
    /// * `match_data` - 对局详情
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 保存成功或对局已存在
    /// * `Err(RepositoryError)` - 数据库操作失败
    async fn save_match(&self, match_data: &MatchData) -> Result<(), RepositoryError>;

    /// 按记录时间返回最早爬取过的玩家
    ///
    /// # 参数
    ///
    /// * `limit` - 返回数量上限
    async fn latest_crawled_players(&self, limit: u64) -> Result<Vec<Player>, RepositoryError>;

    /// 返回名字不在 `names` 中的所有已记录玩家名
    async fn player_names_except(&self, names: &[String]) -> Result<Vec<String>, RepositoryError>;
}
