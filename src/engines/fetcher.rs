// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::rate_limiter::{Permit, RateLimiter};
use crate::engines::traits::{EngineError, HttpTransport};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// 请求错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 网络层错误
    #[error("Transport error: {0}")]
    Transport(#[from] EngineError),

    /// 非200状态码（包括429）
    #[error("invalid status code returned for {url}, expected 200 got {status}")]
    UnexpectedStatus { status: u16, url: String },

    /// 等待限流时收到取消信号
    #[error("Fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// 是否为上游限流（429）
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::UnexpectedStatus { status: 429, .. })
    }

    /// 返回错误携带的状态码
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 限流请求器
///
/// 在速率限制器放行之前阻塞等待，放行后只发出一次请求。
/// 429和其他非200状态码都作为错误返回，不自动重试。
pub struct RateLimitedFetcher {
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<RateLimiter>,
    shutdown: CancellationToken,
}

impl RateLimitedFetcher {
    /// 创建新的限流请求器
    ///
    /// # 参数
    ///
    /// * `transport` - 底层HTTP传输
    /// * `limiter` - 共享的速率限制器
    /// * `shutdown` - 运行级取消令牌，用于中断限流等待
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        limiter: Arc<RateLimiter>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            transport,
            limiter,
            shutdown,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// 获取URL的响应体
    ///
    /// # 返回值
    ///
    /// * `Ok(Bytes)` - 状态码为200时的响应体
    /// * `Err(FetchError)` - 网络错误、非200状态码或等待期间被取消
    pub async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        self.acquire().await?;

        let response = self.transport.get(url).await?;
        match response.status {
            200 => Ok(response.body),
            429 => Err(FetchError::UnexpectedStatus {
                status: response.status,
                url: url.to_string(),
            }),
            status => {
                error!(
                    "route: {} resp: '{}' w/ {}",
                    url,
                    String::from_utf8_lossy(&response.body),
                    status
                );
                Err(FetchError::UnexpectedStatus {
                    status,
                    url: url.to_string(),
                })
            }
        }
    }

    /// 等待速率限制器放行
    ///
    /// 每次醒来后都重新检查，短窗口重置后长窗口可能仍然耗尽
    async fn acquire(&self) -> Result<(), FetchError> {
        loop {
            if self.shutdown.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            match self.limiter.try_consume() {
                Permit::Granted => return Ok(()),
                Permit::Wait(wait) => {
                    debug!(
                        "Rate limit exceeded, sleeping for {:?} | {} tokens consumed",
                        wait,
                        self.limiter.total_consumed()
                    );
                    tokio::select! {
                        _ = self.shutdown.cancelled() => return Err(FetchError::Cancelled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "fetcher_test.rs"]
mod tests;
