//! Traits for abstracting over the datagram socket a peer writes to.
//! 对端写入所用数据报套接字的抽象 trait。

use crate::error::Result;
use crate::packet::Packet;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;

/// A synchronous, non-blocking datagram sink.
///
/// `send_to` returns the number of bytes written. An `Err` is the only
/// failure signal the peer engine recognises.
///
/// 同步、非阻塞的数据报发送端。`send_to` 返回写入的字节数，`Err` 是对端引擎
/// 唯一识别的失败信号。
pub trait PacketSocket: Send + Sync + 'static {
    /// Writes one packet as one datagram to `endpoint`.
    /// 将一个包作为一个数据报写往 `endpoint`。
    fn send_to(&self, packet: &Packet, endpoint: SocketAddr) -> Result<usize>;
}

fn encode(packet: &Packet) -> BytesMut {
    let mut buf = BytesMut::with_capacity(packet.encoded_len());
    packet.encode(&mut buf);
    buf
}

impl PacketSocket for std::net::UdpSocket {
    fn send_to(&self, packet: &Packet, endpoint: SocketAddr) -> Result<usize> {
        std::net::UdpSocket::send_to(self, &encode(packet), endpoint).map_err(Into::into)
    }
}

impl PacketSocket for tokio::net::UdpSocket {
    fn send_to(&self, packet: &Packet, endpoint: SocketAddr) -> Result<usize> {
        self.try_send_to(&encode(packet), endpoint)
            .map_err(Into::into)
    }
}

impl<T: PacketSocket> PacketSocket for Arc<T> {
    fn send_to(&self, packet: &Packet, endpoint: SocketAddr) -> Result<usize> {
        (**self).send_to(packet, endpoint)
    }
}
