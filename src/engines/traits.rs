// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 原始HTTP响应
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP状态码
    pub status: u16,
    /// 响应体
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// HTTP传输特质
///
/// 只负责发出一次GET请求并返回状态码和响应体，不做限流、重试或状态码判断
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 执行GET请求
    async fn get(&self, url: &str) -> Result<RawResponse, EngineError>;

    /// 传输实现名称
    fn name(&self) -> &'static str;
}
