//! Sequenced channel: unreliable, newest-wins delivery.
//! 顺序通道：不可靠、只保留最新的交付。

use super::{Channel, ChannelContext};
use crate::packet::sequence::is_newer;
use crate::packet::{Packet, PacketPool};
use std::collections::VecDeque;
use tracing::trace;

/// Stamps outbound packets with increasing sequences and drops inbound
/// packets older than the newest one delivered. Nothing is retransmitted.
///
/// 为出站包标记递增序列号，丢弃比已交付最新包更旧的入站包。不做重传。
#[derive(Debug, Default)]
pub struct SequencedChannel {
    next_sequence: u16,
    outbound: VecDeque<Packet>,
    last_delivered: Option<u16>,
}

impl SequencedChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Channel for SequencedChannel {
    fn enqueue(&mut self, mut packet: Packet) {
        packet.sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.outbound.push_back(packet);
    }

    fn process_inbound(&mut self, packet: Packet, ctx: &mut ChannelContext<'_>) -> Option<Packet> {
        if let Some(last) = self.last_delivered {
            if !is_newer(packet.sequence, last) {
                trace!(sequence = packet.sequence, last, "Dropping stale sequenced packet");
                return Some(packet);
            }
        }
        self.last_delivered = Some(packet.sequence);
        ctx.deliver(packet);
        None
    }

    fn process_ack(&mut self, ack: &Packet, _ctx: &mut ChannelContext<'_>) {
        trace!(sequence = ack.sequence, "Sequenced channel ignores acks");
    }

    fn dequeue_ready(&mut self, _pool: &PacketPool) -> Option<Packet> {
        self.outbound.pop_front()
    }
}
