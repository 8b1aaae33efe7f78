//! Outbound sliding window shared by the reliable channels.
//! 可靠通道共享的发送滑动窗口。

use crate::config::ChannelConfig;
use crate::packet::sequence::sequence_diff;
use crate::packet::{Packet, PacketPool};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::trace;

#[derive(Debug)]
struct InFlight {
    packet: Packet,
    /// `None` until the first transmission.
    since_sent: Option<Duration>,
}

/// Assigns sequences, keeps unacknowledged packets and decides when each one
/// is due for (re)transmission.
#[derive(Debug)]
pub(super) struct SendWindow {
    window_size: usize,
    resend_delay: Duration,
    /// Sequence of the oldest slot in `in_flight`.
    base: u16,
    queued: VecDeque<Packet>,
    /// Slot `i` holds sequence `base + i`; `None` once acknowledged.
    in_flight: VecDeque<Option<InFlight>>,
}

impl SendWindow {
    pub(super) fn new(config: &ChannelConfig) -> Self {
        Self {
            window_size: config.window_size.clamp(1, 32768),
            resend_delay: config.resend_delay,
            base: 0,
            queued: VecDeque::new(),
            in_flight: VecDeque::new(),
        }
    }

    pub(super) fn enqueue(&mut self, packet: Packet) {
        self.queued.push_back(packet);
    }

    pub(super) fn advance(&mut self, elapsed: Duration) {
        for since_sent in self
            .in_flight
            .iter_mut()
            .flatten()
            .filter_map(|slot| slot.since_sent.as_mut())
        {
            *since_sent += elapsed;
        }
    }

    /// Returns a pooled copy of the next packet due for transmission. The
    /// original stays in the window until acknowledged.
    pub(super) fn dequeue_ready(&mut self, pool: &PacketPool) -> Option<Packet> {
        while self.in_flight.len() < self.window_size {
            let Some(mut packet) = self.queued.pop_front() else {
                break;
            };
            packet.sequence = self.base.wrapping_add(self.in_flight.len() as u16);
            self.in_flight.push_back(Some(InFlight {
                packet,
                since_sent: None,
            }));
        }

        let resend_delay = self.resend_delay;
        let slot = self.in_flight.iter_mut().flatten().find(|slot| {
            slot.since_sent
                .is_none_or(|since_sent| since_sent >= resend_delay)
        })?;
        if slot.since_sent.is_some() {
            trace!(sequence = slot.packet.sequence, kind = %slot.packet.kind, "Retransmitting");
        }
        slot.since_sent = Some(Duration::ZERO);
        Some(pool.duplicate(&slot.packet))
    }

    /// Drops the acknowledged packet and slides the window past every
    /// acknowledged slot at its front.
    pub(super) fn acknowledge(&mut self, sequence: u16, pool: &PacketPool) {
        let offset = sequence_diff(sequence, self.base);
        if offset < 0 || offset as usize >= self.in_flight.len() {
            trace!(sequence, base = self.base, "Ack outside send window ignored");
            return;
        }
        if let Some(acked) = self.in_flight[offset as usize].take() {
            pool.release(acked.packet);
        }
        while let Some(None) = self.in_flight.front() {
            self.in_flight.pop_front();
            self.base = self.base.wrapping_add(1);
        }
    }

    #[cfg(test)]
    pub(super) fn in_flight(&self) -> usize {
        self.in_flight.iter().flatten().count()
    }
}
