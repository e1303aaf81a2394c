// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供任务类型和有界任务队列
pub mod job_queue;

pub use job_queue::{Job, JobQueue, JobResult, DEFAULT_QUEUE_CAPACITY};
