//! 定义协议的所有包类型。
//! Defines all packet kinds understood by the peer engine.

use crate::error::Error;
use std::fmt;

/// The kind of a packet. The first byte on the wire.
/// 包类型，网络传输的第一个字节。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketKind {
    /// Unreliable payload with no channel semantics.
    /// 无通道语义的不可靠载荷。
    None = 0x00,
    /// Connection request.
    /// 连接请求。
    Connect = 0x01,
    /// Connection teardown.
    /// 断开连接。
    Disconnect = 0x02,
    /// RTT probe.
    /// RTT 探测。
    Ping = 0x03,
    /// Reply to a ping, echoing its sequence.
    /// 对 ping 的回复，回显其序列号。
    Pong = 0x04,
    /// Payload on the sequenced channel.
    /// 顺序通道上的载荷。
    Sequenced = 0x05,
    /// Payload on the reliable-unordered channel.
    /// 可靠无序通道上的载荷。
    Reliable = 0x06,
    /// Payload on the reliable-ordered channel.
    /// 可靠有序通道上的载荷。
    ReliableOrdered = 0x07,
    /// Acknowledgment for the reliable-unordered channel.
    /// 可靠无序通道的确认。
    AckReliable = 0x08,
    /// Acknowledgment for the reliable-ordered channel.
    /// 可靠有序通道的确认。
    AckReliableOrdered = 0x09,
}

impl PacketKind {
    /// 从一个字节尝试转换成 `PacketKind`。
    /// Tries to convert a byte into a `PacketKind`.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(PacketKind::None),
            0x01 => Some(PacketKind::Connect),
            0x02 => Some(PacketKind::Disconnect),
            0x03 => Some(PacketKind::Ping),
            0x04 => Some(PacketKind::Pong),
            0x05 => Some(PacketKind::Sequenced),
            0x06 => Some(PacketKind::Reliable),
            0x07 => Some(PacketKind::ReliableOrdered),
            0x08 => Some(PacketKind::AckReliable),
            0x09 => Some(PacketKind::AckReliableOrdered),
            _ => None,
        }
    }

    /// Whether packets of this kind bypass every queue and go straight to the socket.
    /// 该类型的包是否绕过所有队列直接写入套接字。
    pub fn is_immediate(&self) -> bool {
        matches!(self, PacketKind::Ping | PacketKind::Pong)
    }
}

impl TryFrom<u8> for PacketKind {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        PacketKind::from_u8(byte).ok_or(Error::InvalidProtocol(byte))
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PacketKind::None => "NONE",
            PacketKind::Connect => "CONNECT",
            PacketKind::Disconnect => "DISCONNECT",
            PacketKind::Ping => "PING",
            PacketKind::Pong => "PONG",
            PacketKind::Sequenced => "SEQUENCED",
            PacketKind::Reliable => "RELIABLE",
            PacketKind::ReliableOrdered => "RELIABLE-ORDERED",
            PacketKind::AckReliable => "ACK-RELIABLE",
            PacketKind::AckReliableOrdered => "ACK-RELIABLE-ORDERED",
        };
        write!(f, "{}", s)
    }
}
