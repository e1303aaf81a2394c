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

use crate::engines::traits::{EngineError, HttpTransport, RawResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

/// Riot API鉴权请求头
pub const RIOT_TOKEN_HEADER: &str = "X-Riot-Token";

/// 请求引擎
///
/// 基于reqwest实现的HTTP传输，复用同一个连接池。
/// API密钥通过请求头发送，URL中不包含凭据，可以安全地写入日志。
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    /// 创建新的请求引擎
    ///
    /// # 参数
    ///
    /// * `api_key` - 可选的Riot API密钥，设置后附加到每个请求
    /// * `timeout` - 单次请求超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 创建成功
    /// * `Err(EngineError)` - 密钥包含非法字符或客户端构建失败
    pub fn new(api_key: Option<&str>, timeout: Duration) -> Result<Self, EngineError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(key)
                .map_err(|e| EngineError::Other(format!("Invalid api key header: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(RIOT_TOKEN_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; rankcrawl/0.1)")
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestEngine {
    /// 执行HTTP GET请求
    ///
    /// 任何状态码都会返回 `Ok`，状态码的判断交给调用方
    async fn get(&self, url: &str) -> Result<RawResponse, EngineError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse { status, body })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
