// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::Job;
use crate::utils::errors::WorkerError;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 工作器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// 空闲，等待分配任务
    Idle,
    /// 已被预留，即将收到任务
    Assigned,
    /// 正在执行任务
    Busy,
    /// 已停止，终态
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "idle"),
            WorkerState::Assigned => write!(f, "assigned"),
            WorkerState::Busy => write!(f, "busy"),
            WorkerState::Stopped => write!(f, "stopped"),
        }
    }
}

/// 工作池持有的输出通道
///
/// 任务错误和完成通知都发送到池级别的通道，由工作池统一消费
#[derive(Clone)]
pub struct WorkerChannels {
    /// 任务错误
    pub errors: mpsc::UnboundedSender<anyhow::Error>,
    /// 完成通知，携带工作器编号
    pub done: mpsc::UnboundedSender<usize>,
}

/// 工作器
///
/// 每个工作器运行在独立的tokio任务中，只执行显式分配给它的任务，从不主动轮询队列。
/// 状态迁移：Idle → Assigned → Busy → Idle，停止后进入终态Stopped。
pub struct Worker {
    id: usize,
    state: Arc<RwLock<WorkerState>>,
    inbox: mpsc::UnboundedSender<Job>,
    stop: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// 创建并启动工作器
    ///
    /// # 参数
    ///
    /// * `id` - 工作器编号
    /// * `channels` - 工作池持有的错误和完成通道
    ///
    /// # 返回值
    ///
    /// 返回处于Idle状态的工作器
    pub fn spawn(id: usize, channels: WorkerChannels) -> Self {
        let (inbox, jobs) = mpsc::unbounded_channel();
        let state = Arc::new(RwLock::new(WorkerState::Idle));
        let stop = CancellationToken::new();

        let listener = Listener {
            id,
            state: state.clone(),
            stop: stop.clone(),
        };
        let handle = tokio::spawn(listener.run(jobs, channels));

        Self {
            id,
            state,
            inbox,
            stop,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    pub fn is_idle(&self) -> bool {
        self.state() == WorkerState::Idle
    }

    /// 原子地将空闲工作器标记为Assigned
    ///
    /// 检查和修改在同一次写锁内完成，两个并发调用方不可能同时预留同一个工作器
    ///
    /// # 返回值
    ///
    /// 预留成功返回true，工作器不处于Idle时返回false
    pub fn try_reserve(&self) -> bool {
        let mut state = self.state.write();
        if *state == WorkerState::Idle {
            *state = WorkerState::Assigned;
            true
        } else {
            false
        }
    }

    /// 释放一个预留后未使用的工作器
    pub fn release(&self) {
        let mut state = self.state.write();
        if *state == WorkerState::Assigned {
            *state = WorkerState::Idle;
        }
    }

    /// 将任务交给工作器
    ///
    /// 调用方应先通过 `try_reserve` 预留工作器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 任务已送达
    /// * `Err(WorkerError::Stopped)` - 工作器已停止，任务被丢弃
    pub fn attribute(&self, job: Job) -> Result<(), WorkerError> {
        if self.state() == WorkerState::Stopped {
            return Err(WorkerError::Stopped(self.id));
        }
        self.inbox
            .send(job)
            .map_err(|_| WorkerError::Stopped(self.id))
    }

    /// 停止工作器
    ///
    /// 正在执行的任务会继续完成，之后不再接收新任务
    pub fn stop(&self) {
        *self.state.write() = WorkerState::Stopped;
        self.stop.cancel();
    }

    /// 等待工作器任务退出，需先调用 `stop`
    pub async fn join(&self) {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

/// 工作器后台任务持有的状态句柄
struct Listener {
    id: usize,
    state: Arc<RwLock<WorkerState>>,
    stop: CancellationToken,
}

impl Listener {
    /// 切换状态，已停止的工作器保持Stopped
    fn transition(&self, to: WorkerState) {
        let mut state = self.state.write();
        if *state != WorkerState::Stopped {
            *state = to;
        }
    }

    fn is_stopped(&self) -> bool {
        *self.state.read() == WorkerState::Stopped
    }

    async fn run(self, mut jobs: mpsc::UnboundedReceiver<Job>, channels: WorkerChannels) {
        loop {
            let job = tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                job = jobs.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            if self.is_stopped() {
                break;
            }

            debug!("[worker {}] Job received, changing state to busy", self.id);
            self.transition(WorkerState::Busy);

            let outcome = match AssertUnwindSafe(job.run()).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    warn!("[worker {}] Job panicked", self.id);
                    Err(anyhow::anyhow!("job panicked: {}", panic_message(payload.as_ref())))
                }
            };
            if let Err(e) = outcome {
                debug!("[worker {}] Sending err '{}'", self.id, e);
                let _ = channels.errors.send(e);
            }

            self.transition(WorkerState::Idle);
            let _ = channels.done.send(self.id);
            debug!("[worker {}] Changing state to idle", self.id);

            if self.is_stopped() {
                break;
            }
        }

        jobs.close();
        debug!("[worker {}] Stopped", self.id);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "worker_test.rs"]
mod tests;
