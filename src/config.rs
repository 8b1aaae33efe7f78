//! 定义了对端引擎的可配置参数。
//! Defines configurable parameters for the peer engine.

use std::time::Duration;

/// A structure containing all configurable parameters for a peer.
///
/// 包含所有对端可配置参数的结构体。
#[derive(Debug, Clone)]
pub struct Config {
    /// Send-rate ceilings and window length.
    /// 发送速率上限与窗口长度。
    pub flow_control: FlowControlConfig,

    /// RTT estimation and link classification parameters.
    /// RTT 估算与链路分级参数。
    pub rtt: RttConfig,

    /// Parameters of the built-in reliability channels.
    /// 内置可靠性通道的参数。
    pub channel: ChannelConfig,

    /// How often a ping is emitted to measure the round-trip time.
    /// 发送 ping 以测量往返时间的间隔。
    pub ping_interval: Duration,

    /// The largest payload `send` accepts.
    /// `send` 接受的最大载荷。
    pub max_payload_size: usize,
}

/// Send-rate ceilings per flow mode.
///
/// 各流量模式下的发送速率上限。
#[derive(Debug, Clone)]
pub struct FlowControlConfig {
    /// Packets allowed per window while the link is classified as bad.
    /// 链路被判定为差时每个窗口允许的包数。
    pub bad_mode_ceiling: u32,
    /// Packets allowed per window while the link is classified as good.
    /// 链路被判定为好时每个窗口允许的包数。
    pub good_mode_ceiling: u32,
    /// The length of one flow window.
    /// 一个流量窗口的长度。
    pub window: Duration,
}

/// RTT tracking parameters.
///
/// RTT 跟踪参数。
#[derive(Debug, Clone)]
pub struct RttConfig {
    /// An average RTT at or above this value classifies the link as bad.
    /// 平均 RTT 达到或超过该值时，链路被判定为差。
    pub bad_rtt_threshold: Duration,
    /// The number of consecutive good samples that must be exceeded before
    /// upgrading from bad to good.
    /// 从差升级为好之前必须超过的连续良好样本数。
    pub good_streak_threshold: u32,
    /// The accumulated samples are discarded after this much time.
    /// 累积样本在经过该时长后被清除。
    pub reset_interval: Duration,
}

/// Parameters shared by the built-in reliable channels.
///
/// 内置可靠通道共享的参数。
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Maximum number of unacknowledged packets, and the receive window size.
    /// 未确认包的最大数量，同时也是接收窗口大小。
    pub window_size: usize,
    /// Time after which an unacknowledged packet is transmitted again.
    /// 未确认的包在该时长后被重传。
    pub resend_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flow_control: FlowControlConfig::default(),
            rtt: RttConfig::default(),
            channel: ChannelConfig::default(),
            ping_interval: Duration::from_millis(1000),
            max_payload_size: 1200,
        }
    }
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        Self {
            bad_mode_ceiling: 16,
            good_mode_ceiling: 64,
            window: Duration::from_millis(100),
        }
    }
}

impl Default for RttConfig {
    fn default() -> Self {
        Self {
            bad_rtt_threshold: Duration::from_millis(650),
            good_streak_threshold: 32,
            reset_interval: Duration::from_millis(1000),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            window_size: 64,
            resend_delay: Duration::from_millis(250),
        }
    }
}
