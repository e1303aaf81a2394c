// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::BoxFuture;
use metrics::counter;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use tracing::warn;

/// 默认队列容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 200;

/// 任务执行结果
pub type JobResult = anyhow::Result<()>;

/// 任务
///
/// 一个尚未开始执行的工作单元，执行后返回成功或错误。
/// 所有权在分发时从调用方转移到工作池，再转移到工作器。
pub struct Job {
    future: BoxFuture<'static, JobResult>,
}

impl Job {
    /// 包装一个future为任务，future在 `run` 之前不会被轮询
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = JobResult> + Send + 'static,
    {
        Self {
            future: Box::pin(future),
        }
    }

    /// 执行任务
    pub async fn run(self) -> JobResult {
        self.future.await
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").finish_non_exhaustive()
    }
}

/// 有界任务队列
///
/// 先进先出，超过容量的新任务直接丢弃并记录警告，不阻塞也不向调用方返回错误。
/// 所有操作共用一把互斥锁。任务只满足 `Send`，读写锁在这里无法跨任务共享。
pub struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    capacity: usize,
}

impl JobQueue {
    /// 创建指定容量的任务队列
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_QUEUE_CAPACITY))),
            capacity,
        }
    }

    /// 入队任务
    ///
    /// # 返回值
    ///
    /// 入队成功返回true；队列已满时任务被丢弃，返回false
    pub fn submit(&self, job: Job) -> bool {
        let mut jobs = self.jobs.lock();
        if jobs.len() >= self.capacity {
            drop(jobs);
            warn!("Queue limit size reached, ignoring entry");
            counter!("job_queue_dropped_total").increment(1);
            return false;
        }
        jobs.push_back(job);
        true
    }

    /// 取出最早入队的任务，队列为空时返回None
    pub fn pop(&self) -> Option<Job> {
        self.jobs.lock().pop_front()
    }

    pub fn size(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
#[path = "job_queue_test.rs"]
mod tests;
