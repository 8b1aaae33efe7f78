//! Reliable-unordered channel.
//! 可靠无序通道。

use super::window::SendWindow;
use super::{Channel, ChannelContext};
use crate::config::ChannelConfig;
use crate::packet::sequence::sequence_diff;
use crate::packet::{Packet, PacketKind, PacketPool};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::trace;

/// Retransmits until acknowledged and delivers every sequence exactly once,
/// in arrival order.
///
/// 重传直至被确认，每个序列号按到达顺序恰好交付一次。
#[derive(Debug)]
pub struct ReliableChannel {
    send: SendWindow,
    /// Oldest sequence not yet received.
    /// 尚未收到的最旧序列号。
    remote_base: u16,
    /// Slot `i` records whether `remote_base + i` has been received.
    received: VecDeque<bool>,
}

impl ReliableChannel {
    pub fn new(config: &ChannelConfig) -> Self {
        let window_size = config.window_size.clamp(1, 32768);
        Self {
            send: SendWindow::new(config),
            remote_base: 0,
            received: VecDeque::from(vec![false; window_size]),
        }
    }

    fn slide(&mut self) {
        while self.received.front() == Some(&true) {
            self.received.pop_front();
            self.received.push_back(false);
            self.remote_base = self.remote_base.wrapping_add(1);
        }
    }
}

impl Channel for ReliableChannel {
    fn enqueue(&mut self, packet: Packet) {
        self.send.enqueue(packet);
    }

    fn process_inbound(&mut self, packet: Packet, ctx: &mut ChannelContext<'_>) -> Option<Packet> {
        let offset = sequence_diff(packet.sequence, self.remote_base);
        if offset < 0 {
            // Delivered before; our ack was probably lost.
            ctx.ack(PacketKind::AckReliable, packet.sequence);
            return Some(packet);
        }
        let index = offset as usize;
        if index >= self.received.len() {
            trace!(
                sequence = packet.sequence,
                base = self.remote_base,
                "Reliable packet beyond receive window"
            );
            return Some(packet);
        }

        ctx.ack(PacketKind::AckReliable, packet.sequence);
        if self.received[index] {
            return Some(packet);
        }
        self.received[index] = true;
        ctx.deliver(packet);
        self.slide();
        None
    }

    fn process_ack(&mut self, ack: &Packet, ctx: &mut ChannelContext<'_>) {
        self.send.acknowledge(ack.sequence, ctx.pool);
    }

    fn dequeue_ready(&mut self, pool: &PacketPool) -> Option<Packet> {
        self.send.dequeue_ready(pool)
    }

    fn advance(&mut self, elapsed: Duration) {
        self.send.advance(elapsed);
    }
}

#[cfg(test)]
impl ReliableChannel {
    pub(super) fn in_flight(&self) -> usize {
        self.send.in_flight()
    }
}
