// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 请求引擎模块
///
/// 提供HTTP传输、双窗口速率限制器以及组合两者的限流请求器
pub mod fetcher;
pub mod rate_limiter;
pub mod reqwest_engine;
pub mod traits;
