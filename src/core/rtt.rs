//! Round-trip time tracking and link classification.
//! 往返时间跟踪与链路分级。

use super::flow::FlowMode;
use crate::config::RttConfig;
use std::time::Duration;
use tracing::debug;

/// Accumulates RTT samples into a running average and classifies the link.
///
/// One sample at or above the bad threshold downgrades to [`FlowMode::Bad`];
/// upgrading back needs more than `good_streak_threshold` consecutive good
/// samples.
///
/// 将 RTT 样本累积为平均值并对链路分级。一个达到差阈值的样本即降级为
/// [`FlowMode::Bad`]；升级则需要超过 `good_streak_threshold` 个连续良好样本。
#[derive(Debug, Clone)]
pub struct RttTracker {
    config: RttConfig,
    /// Sum of the samples since the last reset, in milliseconds.
    /// 自上次重置以来样本之和（毫秒）。
    sum_ms: u64,
    sample_count: u32,
    average_ms: u64,
    good_streak: u32,
    mode: FlowMode,
    reset_elapsed: Duration,
}

impl RttTracker {
    /// Creates a tracker that starts in [`FlowMode::Bad`].
    ///
    /// 创建一个初始处于 [`FlowMode::Bad`] 的跟踪器。
    pub fn new(config: RttConfig) -> Self {
        Self {
            config,
            sum_ms: 0,
            sample_count: 0,
            average_ms: 0,
            good_streak: 0,
            mode: FlowMode::Bad,
            reset_elapsed: Duration::ZERO,
        }
    }

    /// The current average RTT. Keeps its last value across a reset until a
    /// new sample arrives.
    pub fn average_rtt(&self) -> Duration {
        Duration::from_millis(self.average_ms)
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    /// Records a sample and re-evaluates the flow mode. Returns the new mode if
    /// this sample caused a transition.
    ///
    /// 记录一个样本并重新评估流量模式。若发生转换则返回新模式。
    pub fn record_sample(&mut self, rtt: Duration) -> Option<FlowMode> {
        let rtt_ms = u64::try_from(rtt.as_millis()).unwrap_or(u64::MAX);
        self.sum_ms = self.sum_ms.saturating_add(rtt_ms);
        self.sample_count += 1;
        self.average_ms = self.sum_ms / u64::from(self.sample_count);

        if self.average_rtt() < self.config.bad_rtt_threshold {
            self.good_streak = self.good_streak.saturating_add(1);
            if self.good_streak > self.config.good_streak_threshold && self.mode == FlowMode::Bad {
                self.good_streak = 0;
                return Some(self.transition(FlowMode::Good));
            }
        } else {
            self.good_streak = 0;
            if self.mode != FlowMode::Bad {
                return Some(self.transition(FlowMode::Bad));
            }
        }
        None
    }

    /// Advances the staleness timer. Clears the accumulated samples once
    /// `reset_interval` has elapsed and returns true in that case.
    ///
    /// 推进陈旧计时器。经过 `reset_interval` 后清除累积样本并返回 true。
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.reset_elapsed += elapsed;
        if self.reset_elapsed < self.config.reset_interval {
            return false;
        }
        self.reset_elapsed = Duration::ZERO;
        self.reset();
        true
    }

    /// Clears the accumulator. The average and mode are left as they are.
    pub fn reset(&mut self) {
        debug!(
            samples = self.sample_count,
            average_ms = self.average_ms,
            "RTT accumulator reset"
        );
        self.sum_ms = 0;
        self.sample_count = 0;
    }

    fn transition(&mut self, mode: FlowMode) -> FlowMode {
        debug!(
            from = ?self.mode,
            to = ?mode,
            average_ms = self.average_ms,
            "Flow mode changed"
        );
        self.mode = mode;
        mode
    }
}
