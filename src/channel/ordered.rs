//! Reliable-ordered channel.
//! 可靠有序通道。

use super::window::SendWindow;
use super::{Channel, ChannelContext};
use crate::config::ChannelConfig;
use crate::packet::sequence::sequence_diff;
use crate::packet::{Packet, PacketKind, PacketPool};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::trace;

/// Retransmits until acknowledged and delivers strictly in sequence order,
/// buffering early arrivals inside the receive window.
///
/// 重传直至被确认，并严格按序列号顺序交付，提前到达的包在接收窗口内缓冲。
#[derive(Debug)]
pub struct ReliableOrderedChannel {
    send: SendWindow,
    /// Next sequence to deliver.
    /// 下一个待交付的序列号。
    remote_base: u16,
    /// Slot `i` buffers `remote_base + i` once it arrives out of order.
    pending: VecDeque<Option<Packet>>,
}

impl ReliableOrderedChannel {
    pub fn new(config: &ChannelConfig) -> Self {
        let window_size = config.window_size.clamp(1, 32768);
        let mut pending = VecDeque::with_capacity(window_size);
        pending.resize_with(window_size, || None);
        Self {
            send: SendWindow::new(config),
            remote_base: 0,
            pending,
        }
    }

    fn slide(&mut self) {
        self.pending.pop_front();
        self.pending.push_back(None);
        self.remote_base = self.remote_base.wrapping_add(1);
    }
}

impl Channel for ReliableOrderedChannel {
    fn enqueue(&mut self, packet: Packet) {
        self.send.enqueue(packet);
    }

    fn process_inbound(&mut self, packet: Packet, ctx: &mut ChannelContext<'_>) -> Option<Packet> {
        let offset = sequence_diff(packet.sequence, self.remote_base);
        if offset < 0 {
            ctx.ack(PacketKind::AckReliableOrdered, packet.sequence);
            return Some(packet);
        }
        let index = offset as usize;
        if index >= self.pending.len() {
            trace!(
                sequence = packet.sequence,
                base = self.remote_base,
                "Ordered packet beyond receive window"
            );
            return Some(packet);
        }

        ctx.ack(PacketKind::AckReliableOrdered, packet.sequence);
        if self.pending[index].is_some() {
            return Some(packet);
        }
        if index > 0 {
            trace!(sequence = packet.sequence, base = self.remote_base, "Buffering out-of-order packet");
            self.pending[index] = Some(packet);
            return None;
        }

        ctx.deliver(packet);
        self.slide();
        while let Some(next) = self.pending.front_mut().and_then(Option::take) {
            ctx.deliver(next);
            self.slide();
        }
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
