//! The peer engine for one remote endpoint.
//!
//! A [`Peer`] is owned by the network thread, which drives it through
//! [`Peer::update`] and [`Peer::process_packet`]. Application threads send
//! through cloneable [`PeerHandle`]s. Both share the channels, the plain
//! outbound queue and the packet pool.
//!
//! 单个远端的对端引擎。[`Peer`] 由网络线程持有，通过 [`Peer::update`] 与
//! [`Peer::process_packet`] 驱动；应用线程通过可克隆的 [`PeerHandle`] 发送。
//! 两者共享通道、普通发送队列与包池。

mod dispatch;
mod sending;
mod tick;

use super::flow::{FlowController, FlowMode};
use super::rtt::RttTracker;
use crate::channel::{Channel, ReliableChannel, ReliableOrderedChannel, SequencedChannel};
use crate::config::{ChannelConfig, Config};
use crate::error::Result;
use crate::listener::PeerListener;
use crate::packet::{Packet, PacketKind, PacketPool};
use crate::socket::PacketSocket;
use bytes::Bytes;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How `send` should deliver a payload.
/// `send` 交付载荷的方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    /// Best effort, sent once through the plain queue.
    /// 尽力而为，经普通队列发送一次。
    Unreliable,
    /// Newest-wins on the sequenced channel.
    /// 顺序通道，只保留最新。
    Sequenced,
    /// Reliable, delivered in arrival order.
    /// 可靠，按到达顺序交付。
    ReliableUnordered,
    /// Reliable, delivered in send order.
    /// 可靠，按发送顺序交付。
    ReliableOrdered,
}

impl DeliveryMethod {
    /// The packet kind a payload sent with this method carries.
    /// 以此方式发送的载荷所携带的包类型。
    pub fn kind(self) -> PacketKind {
        match self {
            DeliveryMethod::Unreliable => PacketKind::None,
            DeliveryMethod::Sequenced => PacketKind::Sequenced,
            DeliveryMethod::ReliableUnordered => PacketKind::Reliable,
            DeliveryMethod::ReliableOrdered => PacketKind::ReliableOrdered,
        }
    }
}

/// The three reliability channels a peer drives.
/// 对端驱动的三个可靠性通道。
pub struct Channels {
    pub reliable_ordered: Box<dyn Channel>,
    pub reliable: Box<dyn Channel>,
    pub sequenced: Box<dyn Channel>,
}

impl Channels {
    /// The built-in channel implementations.
    /// 内置通道实现。
    pub fn new(config: &ChannelConfig) -> Self {
        Self {
            reliable_ordered: Box::new(ReliableOrderedChannel::new(config)),
            reliable: Box::new(ReliableChannel::new(config)),
            sequenced: Box::new(SequencedChannel::new()),
        }
    }
}

type ChannelSlot = Mutex<Box<dyn Channel>>;

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State reachable from both the network thread and application threads.
pub(crate) struct Shared<S, L> {
    endpoint: SocketAddr,
    socket: S,
    listener: L,
    pool: PacketPool,
    max_payload_size: usize,
    /// The send lock. It guards the plain queue and is held across every
    /// routing decision, including channel enqueues.
    plain: Mutex<VecDeque<Packet>>,
    reliable_ordered: ChannelSlot,
    reliable: ChannelSlot,
    sequenced: ChannelSlot,
}

/// Ping/pong bookkeeping.
#[derive(Debug, Default)]
struct PingState {
    /// Last ping sequence sent.
    sequence: u16,
    remote_ping_seen: u16,
    pong_seen: u16,
    /// Time since the last ping went out; read when its pong arrives.
    since_ping: Duration,
    /// Time accumulated toward the next scheduled ping.
    ping_timer: Duration,
}

/// The engine for one remote endpoint.
///
/// 单个远端的引擎。
pub struct Peer<S, L> {
    shared: Arc<Shared<S, L>>,
    config: Config,
    flow: FlowController,
    rtt: RttTracker,
    ping: PingState,
}

impl<S: PacketSocket, L: PeerListener> Peer<S, L> {
    /// Creates a peer with the built-in channels.
    ///
    /// 使用内置通道创建对端。
    pub fn new(endpoint: SocketAddr, socket: S, listener: L, config: Config) -> Self {
        let channels = Channels::new(&config.channel);
        Self::with_channels(endpoint, socket, listener, config, channels)
    }

    /// Creates a peer driving the given channels.
    ///
    /// 创建驱动给定通道的对端。
    pub fn with_channels(
        endpoint: SocketAddr,
        socket: S,
        listener: L,
        config: Config,
        channels: Channels,
    ) -> Self {
        let shared = Arc::new(Shared {
            endpoint,
            socket,
            listener,
            pool: PacketPool::new(),
            max_payload_size: config.max_payload_size,
            plain: Mutex::new(VecDeque::new()),
            reliable_ordered: Mutex::new(channels.reliable_ordered),
            reliable: Mutex::new(channels.reliable),
            sequenced: Mutex::new(channels.sequenced),
        });
        Self {
            shared,
            flow: FlowController::new(config.flow_control.clone()),
            rtt: RttTracker::new(config.rtt.clone()),
            ping: PingState::default(),
            config,
        }
    }

    /// A handle application threads can send through.
    /// 供应用线程发送使用的句柄。
    pub fn handle(&self) -> PeerHandle<S, L> {
        PeerHandle {
            shared: self.shared.clone(),
        }
    }

    /// Sends `payload` with the given delivery method.
    /// 以给定方式发送 `payload`。
    pub fn send(&self, payload: impl Into<Bytes>, method: DeliveryMethod) -> Result<()> {
        self.shared.send(payload.into(), method)
    }

    /// Routes a prepared packet by its kind.
    /// 按类型路由一个已准备好的包。
    pub fn send_packet(&self, packet: Packet) -> Result<()> {
        self.shared.send_packet(packet)
    }

    /// Returns a packet the application no longer needs to the pool.
    /// 将应用不再需要的包归还包池。
    pub fn recycle(&self, packet: Packet) {
        self.shared.pool.release(packet);
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.shared.endpoint
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &PacketPool {
        &self.shared.pool
    }

    pub fn flow_mode(&self) -> FlowMode {
        self.rtt.mode()
    }

    pub fn average_rtt(&self) -> Duration {
        self.rtt.average_rtt()
    }

    pub fn rtt(&self) -> &RttTracker {
        &self.rtt
    }

    pub fn flow(&self) -> &FlowController {
        &self.flow
    }

    /// The sequence carried by the most recent ping.
    pub fn ping_sequence(&self) -> u16 {
        self.ping.sequence
    }
}

/// A cloneable sending handle for application threads.
///
/// 供应用线程使用的可克隆发送句柄。
pub struct PeerHandle<S, L> {
    shared: Arc<Shared<S, L>>,
}

impl<S, L> Clone for PeerHandle<S, L> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<S: PacketSocket, L: PeerListener> PeerHandle<S, L> {
    /// Sends `payload` with the given delivery method.
    /// 以给定方式发送 `payload`。
    pub fn send(&self, payload: impl Into<Bytes>, method: DeliveryMethod) -> Result<()> {
        self.shared.send(payload.into(), method)
    }

    /// Routes a prepared packet by its kind.
    /// 按类型路由一个已准备好的包。
    pub fn send_packet(&self, packet: Packet) -> Result<()> {
        self.shared.send_packet(packet)
    }

    /// Takes a packet from the peer's pool.
    /// 从对端的包池获取一个包。
    pub fn acquire(&self, kind: PacketKind) -> Packet {
        self.shared.pool.acquire(kind)
    }

    pub fn recycle(&self, packet: Packet) {
        self.shared.pool.release(packet);
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.shared.endpoint
    }
}
