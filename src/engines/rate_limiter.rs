// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::RateLimitSettings;
use metrics::counter;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// 令牌桶
///
/// 每个周期结束时令牌数直接重置为容量（硬重置，而非按比例补充）。
/// 重置在每次访问时根据窗口起点惰性计算，不需要后台定时任务。
#[derive(Debug)]
pub struct Bucket {
    /// 剩余令牌数
    tokens: u32,
    /// 初始容量
    capacity: u32,
    /// 重置周期
    period: Duration,
    /// 当前窗口起点
    window_start: Instant,
}

impl Bucket {
    /// 创建满容量的令牌桶，窗口从当前时刻开始
    pub fn new(capacity: u32, period: Duration) -> Self {
        Self {
            tokens: capacity,
            capacity,
            period,
            window_start: Instant::now(),
        }
    }

    /// 若已跨过一个或多个周期，窗口起点按整周期前移并补满令牌
    fn refresh(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.period {
            return;
        }

        let periods = (elapsed.as_nanos() / self.period.as_nanos()) as u32;
        self.window_start += self.period * periods;
        self.tokens = self.capacity;
    }

    fn has_capacity(&self) -> bool {
        self.tokens >= 1
    }

    fn consume(&mut self) {
        self.tokens -= 1;
    }

    /// 距离下一次重置的剩余时间
    fn time_to_reset(&self, now: Instant) -> Duration {
        (self.window_start + self.period).saturating_duration_since(now)
    }

    /// 当前剩余令牌数
    pub fn remaining(&mut self) -> u32 {
        self.refresh(Instant::now());
        self.tokens
    }
}

/// 限流检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permit {
    /// 两个桶都有令牌，已各扣除一个
    Granted,
    /// 至少一个桶已耗尽，需要等待给定时长后重新检查
    Wait(Duration),
}

#[derive(Debug)]
struct LimiterState {
    short: Bucket,
    long: Bucket,
    total_consumed: u64,
}

/// 双窗口速率限制器
///
/// 由短窗口和长窗口两个令牌桶组成，只有两个桶同时有余量时才放行。
/// 两个桶和总计数器在同一把锁下检查和扣减，避免并发调用者交错后超额消费。
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    /// 创建新的速率限制器
    ///
    /// # 参数
    ///
    /// * `short_requests` / `short_window` - 短窗口容量与周期
    /// * `long_requests` / `long_window` - 长窗口容量与周期
    pub fn new(
        short_requests: u32,
        short_window: Duration,
        long_requests: u32,
        long_window: Duration,
    ) -> Self {
        Self {
            state: Mutex::new(LimiterState {
                short: Bucket::new(short_requests, short_window),
                long: Bucket::new(long_requests, long_window),
                total_consumed: 0,
            }),
        }
    }

    /// 根据配置创建速率限制器
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            settings.short_window_requests,
            settings.short_window(),
            settings.long_window_requests,
            settings.long_window(),
        )
    }

    /// 尝试消费一个令牌
    ///
    /// # 返回值
    ///
    /// * `Permit::Granted` - 两个桶各扣除一个令牌，总计数加一
    /// * `Permit::Wait(d)` - 未扣除任何令牌，`d` 为两个桶中较长的剩余重置时间
    pub fn try_consume(&self) -> Permit {
        let now = Instant::now();
        let mut state = self.state.lock();
        state.short.refresh(now);
        state.long.refresh(now);

        if state.short.has_capacity() && state.long.has_capacity() {
            state.short.consume();
            state.long.consume();
            state.total_consumed += 1;
            counter!("rate_limiter_tokens_consumed_total").increment(1);
            if state.total_consumed % 50 == 0 {
                debug!("{} tokens consumed", state.total_consumed);
            }
            return Permit::Granted;
        }

        // Wait for the more restrictive window, not the nearer one
        let wait = state
            .short
            .time_to_reset(now)
            .max(state.long.time_to_reset(now));
        Permit::Wait(wait)
    }

    /// 已成功消费的令牌总数
    pub fn total_consumed(&self) -> u64 {
        self.state.lock().total_consumed
    }

    /// 两个桶当前的剩余令牌数 `(短窗口, 长窗口)`
    pub fn remaining(&self) -> (u32, u32) {
        let mut state = self.state.lock();
        (state.short.remaining(), state.long.remaining())
    }
}

#[cfg(test)]
#[path = "rate_limiter_test.rs"]
mod tests;
