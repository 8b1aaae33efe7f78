//! 每个对端的包对象池
//! Per-peer packet object pool
//!
//! A free-list of [`Packet`] records guarded by its own mutex, independent of
//! the peer's send lock. The pool is a cache, not a limit: it grows to match
//! the number of packets in flight.
//!
//! 由独立互斥锁保护的 [`Packet`] 空闲列表，与对端的发送锁互不相关。
//! 包池只是缓存而非上限，其大小随在途包数量增长。

use super::{HEADER_SIZE, Packet, PacketKind};
use crate::error::{Error, Result};
use bytes::Bytes;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 包对象池
/// Packet object pool
#[derive(Debug, Default)]
pub struct PacketPool {
    free: Mutex<Vec<Packet>>,
}

impl PacketPool {
    /// 创建空的包池
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    fn free(&self) -> MutexGuard<'_, Vec<Packet>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 从池中获取包，载荷为空、序列号为零
    /// Acquire a packet with the given kind, an empty payload and sequence zero
    pub fn acquire(&self, kind: PacketKind) -> Packet {
        match self.free().pop() {
            Some(mut packet) => {
                packet.kind = kind;
                packet.sequence = 0;
                packet
            }
            None => Packet::new(kind),
        }
    }

    /// 释放包到池中
    /// Release a packet back to the pool
    pub fn release(&self, mut packet: Packet) {
        packet.payload = Bytes::new();
        self.free().push(packet);
    }

    /// Acquire a copy of `packet`. The payload buffer is shared, not copied.
    /// 获取 `packet` 的副本，载荷缓冲区共享而不复制。
    pub fn duplicate(&self, packet: &Packet) -> Packet {
        let mut copy = self.acquire(packet.kind);
        copy.sequence = packet.sequence;
        copy.payload = packet.payload.clone();
        copy
    }

    /// Decode a datagram into a pooled packet.
    ///
    /// 将数据报解码为池中的包。
    pub fn decode(&self, datagram: &[u8]) -> Result<Packet> {
        if datagram.len() < HEADER_SIZE {
            return Err(Error::InvalidPacket);
        }
        let kind = PacketKind::try_from(datagram[0])?;
        let mut packet = self.acquire(kind);
        packet.sequence = u16::from_be_bytes([datagram[1], datagram[2]]);
        packet.payload = Bytes::copy_from_slice(&datagram[HEADER_SIZE..]);
        Ok(packet)
    }

    /// 当前空闲的包数量
    /// Number of packets currently on the free-list
    pub fn available(&self) -> usize {
        self.free().len()
    }
}
