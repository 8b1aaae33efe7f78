//! The send path: routing packets into channels, the plain queue or straight
//! to the socket.
//! 发送路径：将包路由到通道、普通队列或直接写入套接字。

use super::{DeliveryMethod, Shared, lock};
use crate::channel::ChannelContext;
use crate::error::{Error, Result};
use crate::listener::PeerListener;
use crate::packet::{Packet, PacketKind};
use crate::socket::PacketSocket;
use bytes::Bytes;
use tracing::{trace, warn};

impl<S: PacketSocket, L: PeerListener> Shared<S, L> {
    pub(super) fn send(&self, payload: Bytes, method: DeliveryMethod) -> Result<()> {
        if payload.len() > self.max_payload_size {
            return Err(Error::MessageTooLarge);
        }
        let mut packet = self.pool.acquire(method.kind());
        packet.payload = payload;
        self.send_packet(packet)
    }

    /// The single routing function. Runs under the send lock so concurrent
    /// senders are serialised.
    pub(super) fn send_packet(&self, packet: Packet) -> Result<()> {
        let mut plain = lock(&self.plain);
        trace!(addr = %self.endpoint, kind = %packet.kind, "Routing packet");
        match packet.kind {
            PacketKind::Reliable => lock(&self.reliable).enqueue(packet),
            PacketKind::Sequenced => lock(&self.sequenced).enqueue(packet),
            PacketKind::ReliableOrdered => lock(&self.reliable_ordered).enqueue(packet),
            PacketKind::AckReliable
            | PacketKind::AckReliableOrdered
            | PacketKind::Connect
            | PacketKind::Disconnect
            | PacketKind::None => plain.push_back(packet),
            PacketKind::Ping | PacketKind::Pong => return self.send_immediately(packet),
        }
        Ok(())
    }

    /// Writes a packet to the socket and recycles it right away.
    fn send_immediately(&self, packet: Packet) -> Result<()> {
        let result = self.socket.send_to(&packet, self.endpoint);
        let (kind, sequence) = (packet.kind, packet.sequence);
        self.pool.release(packet);
        match result {
            Ok(bytes) => {
                trace!(addr = %self.endpoint, %kind, sequence, bytes, "Sent immediately");
                Ok(())
            }
            Err(err) => {
                warn!(addr = %self.endpoint, %kind, sequence, error = %err, "Immediate send failed");
                Err(Error::SendFailed(self.endpoint))
            }
        }
    }

    /// The next packet to transmit, in fixed priority order:
    /// reliable-ordered, reliable, sequenced, plain.
    pub(super) fn next_ready(&self) -> Option<Packet> {
        for channel in [&self.reliable_ordered, &self.reliable, &self.sequenced] {
            // Each channel lock is released before the next one is taken.
            let ready = lock(channel).dequeue_ready(&self.pool);
            if ready.is_some() {
                return ready;
            }
        }
        lock(&self.plain).pop_front()
    }

    /// Hands what a channel produced to the listener and the send path.
    pub(super) fn flush(&self, ctx: ChannelContext<'_>) {
        let (delivered, replies) = ctx.into_parts();
        for packet in delivered {
            self.listener.receive_from_peer(packet, self.endpoint);
        }
        for reply in replies {
            if self.send_packet(reply).is_err() {
                self.listener.process_send_error(self.endpoint);
            }
        }
    }
}
