//! The application-facing side of a peer: delivered packets and send errors.
//! 对端面向应用的一侧：交付的包与发送错误。

use crate::packet::Packet;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;

/// Receives what a peer hands to the application.
///
/// 接收对端交给应用的内容。
pub trait PeerListener: Send + Sync + 'static {
    /// A fully processed inbound packet. Ownership moves to the listener.
    /// 一个处理完毕的入站包，所有权转移给监听器。
    fn receive_from_peer(&self, packet: Packet, endpoint: SocketAddr);

    /// The socket rejected a send for `endpoint`.
    /// 套接字拒绝了发往 `endpoint` 的发送。
    fn process_send_error(&self, endpoint: SocketAddr);
}

impl<T: PeerListener> PeerListener for Arc<T> {
    fn receive_from_peer(&self, packet: Packet, endpoint: SocketAddr) {
        (**self).receive_from_peer(packet, endpoint);
    }

    fn process_send_error(&self, endpoint: SocketAddr) {
        (**self).process_send_error(endpoint);
    }
}

/// Events forwarded by [`EventListener`].
/// [`EventListener`] 转发的事件。
#[derive(Debug)]
pub enum PeerEvent {
    Received {
        packet: Packet,
        endpoint: SocketAddr,
    },
    SendError {
        endpoint: SocketAddr,
    },
}

/// A [`PeerListener`] that forwards every event over an unbounded channel.
///
/// 通过无界通道转发所有事件的 [`PeerListener`]。
#[derive(Debug, Clone)]
pub struct EventListener {
    tx: mpsc::UnboundedSender<PeerEvent>,
}

impl EventListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PeerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: PeerEvent) {
        if self.tx.send(event).is_err() {
            trace!("Event receiver dropped, discarding peer event");
        }
    }
}

impl PeerListener for EventListener {
    fn receive_from_peer(&self, packet: Packet, endpoint: SocketAddr) {
        self.forward(PeerEvent::Received { packet, endpoint });
    }

    fn process_send_error(&self, endpoint: SocketAddr) {
        self.forward(PeerEvent::SendError { endpoint });
    }
}
