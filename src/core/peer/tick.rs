//! The per-tick scheduling loop.
//! 每个 tick 的调度循环。

use super::{Peer, lock};
use crate::error::{Error, Result};
use crate::listener::PeerListener;
use crate::packet::PacketKind;
use crate::socket::PacketSocket;
use std::time::Duration;
use tracing::{debug, trace, warn};

impl<S: PacketSocket, L: PeerListener> Peer<S, L> {
    /// Drives the peer forward by `delta`.
    ///
    /// Sends up to this tick's budget of ready packets, then updates the flow
    /// window, the ping schedule and the RTT staleness timer. A socket failure
    /// while draining is reported to the listener and ends the tick.
    ///
    /// 将对端推进 `delta`：在本次预算内发送就绪的包，然后更新流量窗口、ping 计划
    /// 以及 RTT 陈旧计时器。排空时套接字失败会报告给监听器并结束本次 tick。
    pub fn update(&mut self, delta: Duration) {
        let budget = self.flow.budget(self.rtt.mode(), delta);
        for channel in [
            &self.shared.reliable_ordered,
            &self.shared.reliable,
            &self.shared.sequenced,
        ] {
            lock(channel).advance(delta);
        }

        let sent = match self.drain(budget) {
            Ok(sent) => sent,
            Err(err) => {
                warn!(addr = %self.shared.endpoint, error = %err, "Send failed, aborting tick");
                self.shared.listener.process_send_error(self.shared.endpoint);
                return;
            }
        };
        if sent > 0 {
            trace!(addr = %self.shared.endpoint, sent, budget, "Drained outbound packets");
        }
        self.flow.on_sent(sent, delta);

        self.ping.since_ping += delta;
        self.ping.ping_timer += delta;
        if self.ping.ping_timer >= self.config.ping_interval {
            self.ping.ping_timer = Duration::ZERO;
            self.send_ping();
        }

        self.rtt.advance(delta);
    }

    fn drain(&mut self, budget: u32) -> Result<u32> {
        let mut sent = 0;
        while sent < budget {
            let Some(packet) = self.shared.next_ready() else {
                break;
            };
            let result = self.shared.socket.send_to(&packet, self.shared.endpoint);
            self.shared.pool.release(packet);
            if let Err(err) = result {
                debug!(error = %err, "Socket rejected packet");
                return Err(Error::SendFailed(self.shared.endpoint));
            }
            sent += 1;
        }
        Ok(sent)
    }

    fn send_ping(&mut self) {
        self.ping.sequence = self.ping.sequence.wrapping_add(1);
        let mut ping = self.shared.pool.acquire(PacketKind::Ping);
        ping.sequence = self.ping.sequence;
        self.ping.since_ping = Duration::ZERO;
        debug!(addr = %self.shared.endpoint, sequence = self.ping.sequence, "Sending ping");
        if self.shared.send_packet(ping).is_err() {
            self.shared.listener.process_send_error(self.shared.endpoint);
        }
    }
}
