//! tests/common/harness.rs
use harrier::{
    Peer,
    config::Config,
    listener::{EventListener, PeerEvent},
};
use std::net::SocketAddr;
use std::sync::{Arc, Once};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "harrier=debug,peer_exchange=info".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

pub type UdpPeer = Peer<Arc<UdpSocket>, EventListener>;

/// One end of a loopback link: the peer, the socket it writes through and
/// the stream of what it delivers.
pub struct Endpoint {
    pub peer: UdpPeer,
    pub socket: Arc<UdpSocket>,
    pub events: mpsc::UnboundedReceiver<PeerEvent>,
    pub local_addr: SocketAddr,
}

/// Binds two sockets on ephemeral loopback ports and builds a peer on each,
/// addressed at the other.
pub async fn loopback_pair(config: Config) -> (Endpoint, Endpoint) {
    init_tracing();
    let a = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
    let b = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
    let a_addr = a.local_addr().unwrap();
    let b_addr = b.local_addr().unwrap();
    (
        endpoint(a, a_addr, b_addr, config.clone()),
        endpoint(b, b_addr, a_addr, config),
    )
}

fn endpoint(socket: Arc<UdpSocket>, local_addr: SocketAddr, remote: SocketAddr, config: Config) -> Endpoint {
    let (listener, events) = EventListener::new();
    Endpoint {
        peer: Peer::new(remote, socket.clone(), listener, config),
        socket,
        events,
        local_addr,
    }
}

/// Waits for the next delivered packet, skipping send errors.
pub async fn next_payload(events: &mut mpsc::UnboundedReceiver<PeerEvent>) -> Option<harrier::packet::Packet> {
    while let Some(event) = events.recv().await {
        if let PeerEvent::Received { packet, .. } = event {
            return Some(packet);
        }
    }
    None
}
