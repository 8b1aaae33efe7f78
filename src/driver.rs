//! A tokio network loop that owns one peer.
//!
//! [`run`] plays the role of the network thread: it ticks the peer on a fixed
//! interval and feeds it every datagram its endpoint sends. Application tasks
//! send through a [`PeerHandle`](crate::core::peer::PeerHandle) obtained
//! before the peer is moved in.
//!
//! 驱动单个对端的 tokio 网络循环。[`run`] 充当网络线程：按固定间隔推进对端，
//! 并把来自其远端的数据报交给它。应用任务通过事先取得的 `PeerHandle` 发送。

use crate::core::peer::Peer;
use crate::error::Result;
use crate::listener::PeerListener;
use crate::socket::PacketSocket;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Large enough for any UDP datagram, so `recv_from` never truncates.
const MAX_DATAGRAM_SIZE: usize = 65_535;

/// Drives `peer` until `shutdown` fires (or its sender is dropped), then
/// hands the peer back.
///
/// `socket` must be the socket the peer writes through. Datagrams from any
/// address other than the peer's endpoint are ignored. A datagram that fails
/// to decode or is larger than `max_payload_size` allows is logged and
/// skipped, as is a failed receive.
///
/// 驱动 `peer` 直至 `shutdown` 触发（或其发送端被丢弃），随后交还对端。
/// `socket` 必须是对端写入所用的套接字；来自其他地址的数据报会被忽略。
/// 解码失败、超过 `max_payload_size` 的数据报以及接收错误都只记录日志后跳过。
pub async fn run<L: PeerListener>(
    mut peer: Peer<Arc<UdpSocket>, L>,
    socket: Arc<UdpSocket>,
    tick: Duration,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<Peer<Arc<UdpSocket>, L>> {
    let endpoint = peer.endpoint();
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

    info!(addr = %endpoint, ?tick, "Peer driver started");
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                debug!(addr = %endpoint, "Shutdown requested");
                break;
            }
            now = interval.tick() => {
                let delta = now.duration_since(last_tick);
                last_tick = now;
                peer.update(delta);
            }
            received = socket.recv_from(&mut buf) => {
                on_received(&mut peer, received, &buf);
            }
        }
    }
    info!(addr = %endpoint, "Peer driver stopped");
    Ok(peer)
}

/// Hands one `recv_from` result to the peer. Never fails: every problem with
/// a single datagram is logged and the loop carries on.
fn on_received<S: PacketSocket, L: PeerListener>(
    peer: &mut Peer<S, L>,
    received: io::Result<(usize, SocketAddr)>,
    buf: &[u8],
) {
    let endpoint = peer.endpoint();
    let (len, from) = match received {
        Ok(received) => received,
        Err(err) => {
            warn!(addr = %endpoint, error = %err, "Receive failed, continuing");
            return;
        }
    };
    if from != endpoint {
        trace!(%from, "Ignoring datagram from unknown address");
        return;
    }
    if let Err(err) = peer.process_datagram(&buf[..len]) {
        warn!(addr = %endpoint, len, error = %err, "Dropping invalid datagram");
    }
}
