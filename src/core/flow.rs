//! 流量控制器：把流量模式与经过的时间换算为每次 tick 的发送预算
//! Flow controller: turns the flow mode and elapsed time into a per-tick send budget

use crate::config::FlowControlConfig;
use std::time::Duration;
use tracing::trace;

/// Two-state classification of the link quality.
/// 链路质量的二态分级。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMode {
    /// High RTT, low ceiling.
    /// 高 RTT，低上限。
    Bad,
    /// Low RTT, high ceiling.
    /// 低 RTT，高上限。
    Good,
}

/// A token-bucket-like admission limit over fixed windows.
///
/// 基于固定窗口的类令牌桶准入限制。
#[derive(Debug, Clone)]
pub struct FlowController {
    config: FlowControlConfig,
    sent_this_window: u32,
    window_elapsed: Duration,
}

impl FlowController {
    pub fn new(config: FlowControlConfig) -> Self {
        Self {
            config,
            sent_this_window: 0,
            window_elapsed: Duration::ZERO,
        }
    }

    /// Packets allowed per window in `mode`.
    /// `mode` 下每个窗口允许的包数。
    pub fn ceiling(&self, mode: FlowMode) -> u32 {
        match mode {
            FlowMode::Bad => self.config.bad_mode_ceiling,
            FlowMode::Good => self.config.good_mode_ceiling,
        }
    }

    /// The number of packets that may be sent in a tick of length `delta`.
    ///
    /// `min(ceiling - sent_this_window, floor(ceiling * delta / window))`
    ///
    /// 长度为 `delta` 的 tick 内可发送的包数。
    pub fn budget(&self, mode: FlowMode, delta: Duration) -> u32 {
        let ceiling = self.ceiling(mode);
        let available = ceiling.saturating_sub(self.sent_this_window);
        let pro_rated = (u128::from(ceiling) * delta.as_nanos())
            .checked_div(self.config.window.as_nanos())
            .unwrap_or(u128::from(ceiling));
        let budget = u128::from(available).min(pro_rated) as u32;
        trace!(
            ?mode,
            ceiling,
            sent_this_window = self.sent_this_window,
            budget,
            "Computed send budget"
        );
        budget
    }

    /// Accounts for packets sent during a tick of length `delta`, rolling the
    /// window once its length is reached.
    ///
    /// 记录一次 tick 内实际发送的包数，窗口时长达到后滚动窗口。
    pub fn on_sent(&mut self, sent: u32, delta: Duration) {
        self.sent_this_window = self.sent_this_window.saturating_add(sent);
        self.window_elapsed += delta;
        if self.window_elapsed >= self.config.window {
            self.sent_this_window = 0;
            self.window_elapsed = Duration::ZERO;
        }
    }

    pub fn sent_this_window(&self) -> u32 {
        self.sent_this_window
    }
}
