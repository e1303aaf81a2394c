// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::{Job, JobQueue};
use crate::workers::worker::{Worker, WorkerChannels, WorkerState};
use metrics::gauge;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 确认空闲时的轮询间隔
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 工作池
///
/// 持有固定数量的工作器和一个有界等待队列。新任务优先直接交给空闲工作器，
/// 否则进入队列，由后台分发循环在工作器完成任务后继续分配。
pub struct Pool {
    inner: Arc<PoolInner>,
    errors: Mutex<Option<mpsc::UnboundedReceiver<anyhow::Error>>>,
    closed: AtomicBool,
    shutdown: CancellationToken,
    redistributor: Mutex<Option<JoinHandle<()>>>,
}

/// 分发循环与调用方共享的状态
struct PoolInner {
    workers: Vec<Worker>,
    queue: JobQueue,
    outstanding: watch::Sender<usize>,
}

impl PoolInner {
    /// 预留一个空闲工作器，优先尝试 `preferred`
    fn reserve_idle(&self, preferred: Option<usize>) -> Option<&Worker> {
        if let Some(worker) = preferred.and_then(|id| self.workers.get(id)) {
            if worker.try_reserve() {
                return Some(worker);
            }
        }
        self.workers.iter().find(|w| w.try_reserve())
    }

    /// 把任务交给已预留的工作器，失败时撤销计数
    fn assign(&self, worker: &Worker, job: Job) {
        debug!("Assigning job to worker {}", worker.id());
        if let Err(e) = worker.attribute(job) {
            warn!("Failed to hand job over: {}", e);
            self.finish_one();
        }
    }

    /// 只要还有空闲工作器和排队任务就持续分配
    ///
    /// 预留到工作器但队列已空时先释放，再检查一次队列，
    /// 避免另一个调用方恰好在此期间入队却找不到空闲工作器
    fn pump(&self, preferred: Option<usize>) {
        let mut preferred = preferred;
        loop {
            let Some(worker) = self.reserve_idle(preferred.take()) else {
                return;
            };
            match self.queue.pop() {
                Some(job) => self.assign(worker, job),
                None => {
                    worker.release();
                    if self.queue.is_empty() {
                        return;
                    }
                }
            }
        }
    }

    fn start_one(&self) {
        self.outstanding.send_modify(|n| {
            *n += 1;
            gauge!("pool_outstanding_jobs").set(*n as f64);
        });
    }

    fn finish_one(&self) {
        self.outstanding.send_modify(|n| {
            *n = n.saturating_sub(1);
            gauge!("pool_outstanding_jobs").set(*n as f64);
        });
    }

    fn is_quiescent(&self) -> bool {
        self.queue.is_empty()
            && self
                .workers
                .iter()
                .all(|w| !matches!(w.state(), WorkerState::Assigned | WorkerState::Busy))
    }
}

impl Pool {
    /// 创建工作池并启动所有工作器和分发循环
    ///
    /// # 参数
    ///
    /// * `worker_count` - 工作器数量，至少为1
    /// * `queue_capacity` - 等待队列容量
    ///
    /// # 返回值
    ///
    /// 返回可在任务间共享的工作池
    pub fn new(worker_count: usize, queue_capacity: usize) -> Arc<Self> {
        let worker_count = worker_count.max(1);
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let channels = WorkerChannels {
            errors: errors_tx,
            done: done_tx,
        };
        let workers = (0..worker_count)
            .map(|id| Worker::spawn(id, channels.clone()))
            .collect();
        drop(channels);

        let (outstanding, _) = watch::channel(0usize);
        let inner = Arc::new(PoolInner {
            workers,
            queue: JobQueue::new(queue_capacity),
            outstanding,
        });

        let shutdown = CancellationToken::new();
        let redistributor = tokio::spawn(Self::redistribute(
            inner.clone(),
            done_rx,
            shutdown.clone(),
        ));

        info!(
            "Pool created with {} workers, queue capacity {}",
            worker_count, queue_capacity
        );

        Arc::new(Self {
            inner,
            errors: Mutex::new(Some(errors_rx)),
            closed: AtomicBool::new(false),
            shutdown,
            redistributor: Mutex::new(Some(redistributor)),
        })
    }

    /// 按种子玩家数计算工作器数量：每三个种子一个工作器，至少一个
    pub fn capacity_for(seed_count: usize) -> usize {
        (seed_count / 3).max(1)
    }

    /// 分发任务
    ///
    /// 有空闲工作器时直接交付，否则进入队列；队列已满时任务被丢弃。
    /// 工作池关闭后的分发不做任何事。
    pub fn dispatch(&self, job: Job) {
        if self.is_closed() {
            debug!("Pool is closed, dropping job");
            return;
        }

        self.inner.start_one();

        if let Some(worker) = self.inner.reserve_idle(None) {
            self.inner.assign(worker, job);
            return;
        }

        self.enqueue(job);
    }

    /// 入队并尝试立即分配
    ///
    /// 入队后再次检查关闭标志：与 `close` 并发时任务可能在队列被清空之后才入队，
    /// 此时清空队列并撤销计数，避免留下永远无法完成的任务
    fn enqueue(&self, job: Job) {
        debug!("No idle worker, queueing job");
        if !self.inner.queue.submit(job) {
            self.inner.finish_one();
            return;
        }

        if self.is_closed() {
            self.discard_queued();
            self.inner.finish_one();
            return;
        }
        self.inner.pump(None);
    }

    /// 丢弃所有排队任务，返回丢弃数量
    fn discard_queued(&self) -> usize {
        let mut discarded = 0usize;
        while self.inner.queue.pop().is_some() {
            discarded += 1;
        }
        discarded
    }

    /// 等待所有任务完成
    ///
    /// 先等待未完成任务计数归零，再短暂轮询确认队列为空且所有工作器空闲。
    /// 任务只能由正在执行的任务派生，因此这一时刻之后不会再有新任务。
    pub async fn wait_for_completion(&self) {
        let mut outstanding = self.inner.outstanding.subscribe();
        if outstanding.wait_for(|n| *n == 0).await.is_err() {
            return;
        }

        while !self.is_closed() && !self.inner.is_quiescent() {
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
    }

    /// 关闭工作池
    ///
    /// 依次停止分发循环、停止并等待所有工作器，之后错误通道的发送端全部释放。
    /// 重复调用无副作用。
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Closing pool");

        self.shutdown.cancel();
        let redistributor = self.redistributor.lock().take();
        if let Some(handle) = redistributor {
            let _ = handle.await;
        }

        for worker in &self.inner.workers {
            worker.stop();
        }
        for worker in &self.inner.workers {
            worker.join().await;
        }

        let discarded = self.discard_queued();
        if discarded > 0 {
            warn!("Discarded {} queued jobs on close", discarded);
        }

        self.inner.outstanding.send_replace(0);
        gauge!("pool_outstanding_jobs").set(0.0);
        info!("Pool closed");
    }

    /// 取出错误通道的接收端，只能取出一次
    pub fn take_errors(&self) -> Option<mpsc::UnboundedReceiver<anyhow::Error>> {
        self.errors.lock().take()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn worker_count(&self) -> usize {
        self.inner.workers.len()
    }

    pub fn queued(&self) -> usize {
        self.inner.queue.size()
    }

    /// 当前已接收但尚未完成的任务数
    pub fn outstanding(&self) -> usize {
        *self.inner.outstanding.borrow()
    }

    async fn redistribute(
        inner: Arc<PoolInner>,
        mut done: mpsc::UnboundedReceiver<usize>,
        shutdown: CancellationToken,
    ) {
        debug!("Redistribution loop started");
        loop {
            let id = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                id = done.recv() => match id {
                    Some(id) => id,
                    None => break,
                },
            };

            inner.pump(Some(id));
            inner.finish_one();
        }
        debug!("Redistribution loop stopped");
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        if !self.is_closed() {
            self.shutdown.cancel();
            for worker in &self.inner.workers {
                worker.stop();
            }
        }
    }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
