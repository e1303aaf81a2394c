// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::match_repository::RepositoryError;
use crate::engines::fetcher::FetchError;
use thiserror::Error;

/// 爬取错误类型
///
/// 单个玩家爬取任务中出现的错误，出现任何一个都会中止该任务
#[derive(Error, Debug)]
pub enum CrawlError {
    /// 请求错误（网络失败、非200状态码、取消）
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// 响应体解析失败
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// 持久化错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// 静态数据中找不到该英雄
    #[error("Champion not found: {0}")]
    ChampionNotFound(String),

    /// 静态数据版本列表为空
    #[error("Static data version list is empty")]
    EmptyVersionList,
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    /// 工作器已停止，不再接收任务
    #[error("Worker {0} is stopped")]
    Stopped(usize),
}
