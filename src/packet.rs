//! The packet module: the reusable packet record, its kind tags, sequence
//! arithmetic and the per-peer packet pool.
//! packet 模块：可复用的包记录、包类型标签、序列号运算以及每个对端的包池。

pub mod kind;
pub mod pool;
pub mod sequence;

pub use kind::PacketKind;
pub use pool::PacketPool;

use bytes::{BufMut, Bytes};

/// Size of the `kind | sequence` header written by [`Packet::encode`].
pub const HEADER_SIZE: usize = 3;

/// A reusable mutable packet record.
///
/// The payload is opaque to the engine; only `kind` and `sequence` are
/// interpreted. A `Packet` value has exactly one owner at a time: the pool,
/// an outbound queue/channel, or the application after delivery.
///
/// 可复用的可变包记录。载荷对引擎不透明，只解释 `kind` 与 `sequence`。
/// 任一时刻一个 `Packet` 只有一个所有者：包池、发送队列/通道，或交付后的应用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// The kind tag.
    /// 包类型标签。
    pub kind: PacketKind,
    /// 16-bit sequence number, compared with [`sequence::is_newer`].
    /// 16位序列号，使用 [`sequence::is_newer`] 比较。
    pub sequence: u16,
    /// The opaque payload.
    /// 不透明载荷。
    pub payload: Bytes,
}

impl Packet {
    pub(crate) fn new(kind: PacketKind) -> Self {
        Self {
            kind,
            sequence: 0,
            payload: Bytes::new(),
        }
    }

    /// Number of bytes [`Packet::encode`] writes.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// 将包编码到缓冲区。
    /// Encodes the packet into a buffer.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.kind as u8);
        buf.put_u16(self.sequence);
        buf.put_slice(&self.payload);
    }
}
