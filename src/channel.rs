//! Reliability channels: the contract the peer engine drives, and the three
//! built-in implementations.
//!
//! 可靠性通道：对端引擎驱动的通道契约，以及三个内置实现。

pub mod ordered;
pub mod reliable;
pub mod sequenced;
mod window;

pub use ordered::ReliableOrderedChannel;
pub use reliable::ReliableChannel;
pub use sequenced::SequencedChannel;

use crate::packet::{Packet, PacketKind, PacketPool};
use std::time::Duration;

/// A reliability strategy that buffers, may retransmit and may reorder
/// payload packets independently of the peer's flow control.
///
/// The peer serialises access to each channel; implementations only need to
/// be `Send`.
///
/// 可靠性策略：独立于对端流量控制地缓冲、重传与重排载荷包。
/// 对端会串行化对每个通道的访问，实现只需满足 `Send`。
pub trait Channel: Send {
    /// Takes ownership of an outbound packet. Never blocks.
    /// 接管一个待发送的包，从不阻塞。
    fn enqueue(&mut self, packet: Packet);

    /// Handles an inbound payload packet.
    ///
    /// Returns `None` when the channel took ownership (delivered it through
    /// `ctx` or buffered it), or `Some(packet)` to hand it back for recycling.
    ///
    /// 处理一个入站载荷包。通道接管所有权（经 `ctx` 交付或缓冲）时返回 `None`，
    /// 否则返回 `Some(packet)` 交还调用方回收。
    fn process_inbound(&mut self, packet: Packet, ctx: &mut ChannelContext<'_>) -> Option<Packet>;

    /// Advances the retransmission window with an acknowledgment. The caller
    /// keeps ownership of `ack`.
    ///
    /// 用确认包推进重传窗口。`ack` 的所有权仍归调用方。
    fn process_ack(&mut self, ack: &Packet, ctx: &mut ChannelContext<'_>);

    /// The next packet ready for transmission, if any. Polled every tick.
    ///
    /// 下一个可发送的包（若有）。每个 tick 都会轮询。
    fn dequeue_ready(&mut self, pool: &PacketPool) -> Option<Packet>;

    /// Called once per tick with the elapsed time, before any dequeue.
    ///
    /// 每个 tick 在出队之前以经过的时间调用一次。
    fn advance(&mut self, _elapsed: Duration) {}
}

/// What a channel may do while handling inbound traffic: use the pool, hand
/// packets to the application and queue replies such as acks.
///
/// The peer delivers and routes the collected packets after the channel's
/// lock has been released.
///
/// 通道处理入站流量时可执行的操作：使用包池、向应用交付包、排队回复（如确认）。
/// 对端会在释放通道锁后交付并路由收集到的包。
pub struct ChannelContext<'a> {
    pool: &'a PacketPool,
    delivered: Vec<Packet>,
    replies: Vec<Packet>,
}

impl<'a> ChannelContext<'a> {
    pub fn new(pool: &'a PacketPool) -> Self {
        Self {
            pool,
            delivered: Vec::new(),
            replies: Vec::new(),
        }
    }

    pub fn acquire(&self, kind: PacketKind) -> Packet {
        self.pool.acquire(kind)
    }

    pub fn release(&self, packet: Packet) {
        self.pool.release(packet);
    }

    /// Hands a packet to the application listener.
    /// 将包交付给应用监听器。
    pub fn deliver(&mut self, packet: Packet) {
        self.delivered.push(packet);
    }

    /// Queues a reply (usually an ack) to be routed through the send path.
    /// 排队一个回复（通常是确认），稍后经发送路径路由。
    pub fn reply(&mut self, packet: Packet) {
        self.replies.push(packet);
    }

    /// Queues an ack of `kind` for `sequence`.
    /// 为 `sequence` 排队一个 `kind` 类型的确认。
    pub fn ack(&mut self, kind: PacketKind, sequence: u16) {
        let mut ack = self.acquire(kind);
        ack.sequence = sequence;
        self.reply(ack);
    }

    pub(crate) fn into_parts(self) -> (Vec<Packet>, Vec<Packet>) {
        (self.delivered, self.replies)
    }
}
