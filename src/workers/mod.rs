// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供固定数量的工作器和负责分发、回收任务的工作池
pub mod pool;
pub mod worker;

pub use pool::Pool;
pub use worker::{Worker, WorkerChannels, WorkerState};
