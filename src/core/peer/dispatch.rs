//! The receive path: one inbound packet is dispatched by kind.
//! 接收路径：按类型分发一个入站包。

use super::{ChannelSlot, Peer, lock};
use crate::channel::ChannelContext;
use crate::error::{Error, Result};
use crate::listener::PeerListener;
use crate::packet::sequence::is_newer;
use crate::packet::{HEADER_SIZE, Packet, PacketKind};
use crate::socket::PacketSocket;
use tracing::trace;

impl<S: PacketSocket, L: PeerListener> Peer<S, L> {
    /// Decodes a datagram through the pool and dispatches it.
    ///
    /// A datagram whose payload exceeds `max_payload_size` is rejected with
    /// [`Error::MessageTooLarge`] before anything is taken from the pool.
    ///
    /// 通过包池解码数据报并分发。载荷超过 `max_payload_size` 的数据报会在
    /// 取用包池之前以 [`Error::MessageTooLarge`] 拒绝。
    pub fn process_datagram(&mut self, datagram: &[u8]) -> Result<()> {
        if datagram.len() > HEADER_SIZE + self.shared.max_payload_size {
            return Err(Error::MessageTooLarge);
        }
        let packet = self.shared.pool.decode(datagram)?;
        self.process_packet(packet);
        Ok(())
    }

    /// Consumes one inbound packet.
    ///
    /// Control and payload packets that are not handed to the application
    /// go back to the pool exactly once. `None`, `Connect` and `Disconnect`
    /// packets are delivered to the listener, which takes ownership.
    ///
    /// 处理一个入站包。未交给应用的控制包与载荷包恰好归还包池一次；
    /// `None`、`Connect` 与 `Disconnect` 包交付给监听器，由其接管所有权。
    pub fn process_packet(&mut self, packet: Packet) {
        match packet.kind {
            PacketKind::Ping => self.on_ping(packet),
            PacketKind::Pong => self.on_pong(packet),
            PacketKind::AckReliable => self.on_ack(Slot::Reliable, packet),
            PacketKind::AckReliableOrdered => self.on_ack(Slot::ReliableOrdered, packet),
            PacketKind::Sequenced => self.on_payload(Slot::Sequenced, packet),
            PacketKind::Reliable => self.on_payload(Slot::Reliable, packet),
            PacketKind::ReliableOrdered => self.on_payload(Slot::ReliableOrdered, packet),
            PacketKind::None | PacketKind::Connect | PacketKind::Disconnect => {
                self.shared
                    .listener
                    .receive_from_peer(packet, self.shared.endpoint);
            }
        }
    }

    fn on_ping(&mut self, ping: Packet) {
        let sequence = ping.sequence;
        self.shared.pool.release(ping);
        if !is_newer(sequence, self.ping.remote_ping_seen) {
            trace!(sequence, last = self.ping.remote_ping_seen, "Ignoring stale ping");
            return;
        }
        self.ping.remote_ping_seen = sequence;

        let mut pong = self.shared.pool.acquire(PacketKind::Pong);
        pong.sequence = sequence;
        if self.shared.send_packet(pong).is_err() {
            self.shared.listener.process_send_error(self.shared.endpoint);
        }
    }

    fn on_pong(&mut self, pong: Packet) {
        let sequence = pong.sequence;
        self.shared.pool.release(pong);
        if !is_newer(sequence, self.ping.pong_seen) {
            trace!(sequence, last = self.ping.pong_seen, "Ignoring stale pong");
            return;
        }
        self.ping.pong_seen = sequence;

        let rtt = self.ping.since_ping;
        trace!(addr = %self.shared.endpoint, sequence, rtt_ms = rtt.as_millis() as u64, "Pong received");
        self.rtt.record_sample(rtt);
    }

    fn on_ack(&mut self, slot: Slot, ack: Packet) {
        let mut ctx = ChannelContext::new(&self.shared.pool);
        lock(self.slot(slot)).process_ack(&ack, &mut ctx);
        self.shared.pool.release(ack);
        self.shared.flush(ctx);
    }

    fn on_payload(&mut self, slot: Slot, packet: Packet) {
        let mut ctx = ChannelContext::new(&self.shared.pool);
        let returned = lock(self.slot(slot)).process_inbound(packet, &mut ctx);
        if let Some(packet) = returned {
            self.shared.pool.release(packet);
        }
        self.shared.flush(ctx);
    }

    fn slot(&self, slot: Slot) -> &ChannelSlot {
        match slot {
            Slot::ReliableOrdered => &self.shared.reliable_ordered,
            Slot::Reliable => &self.shared.reliable,
            Slot::Sequenced => &self.shared.sequenced,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    ReliableOrdered,
    Reliable,
    Sequenced,
}
