//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use std::net::SocketAddr;
use thiserror::Error;

/// The primary error type for the peer engine.
/// 对端引擎的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// An underlying I/O error occurred.
    /// 发生了底层的I/O错误。
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A packet carried a kind tag outside the known set. This points at a
    /// corrupt or malicious datagram and is never swallowed.
    ///
    /// 包类型标签不在已知集合内，说明数据报损坏或恶意构造，绝不能静默丢弃。
    #[error("invalid protocol: unknown packet kind {0:#04x}")]
    InvalidProtocol(u8),

    /// A datagram was too short to hold a packet header.
    /// 数据报过短，无法容纳包头。
    #[error("Invalid packet received")]
    InvalidPacket,

    /// The provided payload is larger than the configured `max_payload_size`.
    /// 提供的载荷大于配置的 `max_payload_size`。
    #[error("the message is too large to be sent")]
    MessageTooLarge,

    /// The socket rejected an immediate (ping/pong) write to the given endpoint.
    /// 套接字拒绝了发往该端点的即时（ping/pong）写入。
    #[error("socket rejected send to {0}")]
    SendFailed(SocketAddr),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::Io(e) => e,
            Error::InvalidProtocol(tag) => std::io::Error::new(
                ErrorKind::InvalidData,
                format!("unknown packet kind {tag:#04x}"),
            ),
            Error::InvalidPacket => ErrorKind::InvalidData.into(),
            Error::MessageTooLarge => ErrorKind::InvalidInput.into(),
            Error::SendFailed(_) => ErrorKind::BrokenPipe.into(),
        }
    }
}
