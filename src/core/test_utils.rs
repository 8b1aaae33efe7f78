//! Common testing infrastructure for peer engine tests.

use super::peer::{Channels, Peer};
use crate::{
    channel::{Channel, ChannelContext},
    config::Config,
    error::{Error, Result},
    listener::PeerListener,
    packet::{Packet, PacketKind, PacketPool},
    socket::PacketSocket,
};
use bytes::Bytes;
use std::{
    collections::VecDeque,
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{
        Arc, Mutex, Once,
        atomic::{AtomicBool, Ordering},
    },
};

pub const TEST_PEER_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 54321);

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "harrier=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

// --- Mock Socket ---

/// A socket that records every packet it is asked to write.
/// Flip `fail` to make every write return an error.
#[derive(Default)]
pub struct MockSocket {
    pub sent: Mutex<Vec<Packet>>,
    pub fail: AtomicBool,
}

impl MockSocket {
    pub fn sent(&self) -> Vec<Packet> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_kinds(&self) -> Vec<PacketKind> {
        self.sent.lock().unwrap().iter().map(|p| p.kind).collect()
    }

    pub fn take_sent(&self) -> Vec<Packet> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl PacketSocket for MockSocket {
    fn send_to(&self, packet: &Packet, _endpoint: SocketAddr) -> Result<usize> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Io(io::ErrorKind::ConnectionRefused.into()));
        }
        self.sent.lock().unwrap().push(packet.clone());
        Ok(packet.encoded_len())
    }
}

// --- Mock Listener ---

#[derive(Default)]
pub struct MockListener {
    pub received: Mutex<Vec<Packet>>,
    pub send_errors: Mutex<Vec<SocketAddr>>,
}

impl MockListener {
    pub fn received(&self) -> Vec<Packet> {
        self.received.lock().unwrap().clone()
    }

    pub fn send_error_count(&self) -> usize {
        self.send_errors.lock().unwrap().len()
    }
}

impl PeerListener for MockListener {
    fn receive_from_peer(&self, packet: Packet, _endpoint: SocketAddr) {
        self.received.lock().unwrap().push(packet);
    }

    fn process_send_error(&self, endpoint: SocketAddr) {
        self.send_errors.lock().unwrap().push(endpoint);
    }
}

// --- Mock Channel ---

/// What a `MockChannel` saw, shared with the test.
#[derive(Default)]
pub struct ChannelLog {
    pub enqueued: Mutex<Vec<Packet>>,
    pub inbound: Mutex<Vec<u16>>,
    pub acks: Mutex<Vec<u16>>,
    pub advanced: Mutex<Vec<std::time::Duration>>,
}

/// A scripted channel: `ready` feeds `dequeue_ready`, and `retain_inbound`
/// decides whether inbound packets are kept (and delivered) or handed back.
pub struct MockChannel {
    pub ready: VecDeque<Packet>,
    pub retain_inbound: bool,
    pub log: Arc<ChannelLog>,
}

impl MockChannel {
    pub fn new(log: Arc<ChannelLog>) -> Self {
        Self {
            ready: VecDeque::new(),
            retain_inbound: false,
            log,
        }
    }

    pub fn with_ready(mut self, kind: PacketKind, body: &'static [u8]) -> Self {
        self.ready.push_back(Packet {
            kind,
            sequence: self.ready.len() as u16,
            payload: Bytes::from_static(body),
        });
        self
    }

    pub fn retaining(mut self) -> Self {
        self.retain_inbound = true;
        self
    }
}

impl Channel for MockChannel {
    fn enqueue(&mut self, packet: Packet) {
        self.log.enqueued.lock().unwrap().push(packet);
    }

    fn process_inbound(&mut self, packet: Packet, ctx: &mut ChannelContext<'_>) -> Option<Packet> {
        self.log.inbound.lock().unwrap().push(packet.sequence);
        if self.retain_inbound {
            ctx.deliver(packet);
            None
        } else {
            Some(packet)
        }
    }

    fn process_ack(&mut self, ack: &Packet, _ctx: &mut ChannelContext<'_>) {
        self.log.acks.lock().unwrap().push(ack.sequence);
    }

    fn dequeue_ready(&mut self, _pool: &PacketPool) -> Option<Packet> {
        self.ready.pop_front()
    }

    fn advance(&mut self, elapsed: std::time::Duration) {
        self.log.advanced.lock().unwrap().push(elapsed);
    }
}

/// Mock channels for a peer, with one shared log per channel.
pub struct MockChannels {
    pub reliable_ordered: Arc<ChannelLog>,
    pub reliable: Arc<ChannelLog>,
    pub sequenced: Arc<ChannelLog>,
}

impl MockChannels {
    pub fn new() -> Self {
        Self {
            reliable_ordered: Arc::default(),
            reliable: Arc::default(),
            sequenced: Arc::default(),
        }
    }

    pub fn channels(&self) -> Channels {
        Channels {
            reliable_ordered: Box::new(MockChannel::new(self.reliable_ordered.clone())),
            reliable: Box::new(MockChannel::new(self.reliable.clone())),
            sequenced: Box::new(MockChannel::new(self.sequenced.clone())),
        }
    }
}

pub type TestPeer = Peer<Arc<MockSocket>, Arc<MockListener>>;

/// A peer wired to a mock socket, mock listener and the given channels.
pub fn peer_with_channels(
    config: Config,
    channels: Channels,
) -> (TestPeer, Arc<MockSocket>, Arc<MockListener>) {
    init_tracing();
    let socket = Arc::new(MockSocket::default());
    let listener = Arc::new(MockListener::default());
    let peer = Peer::with_channels(
        TEST_PEER_ADDR,
        socket.clone(),
        listener.clone(),
        config,
        channels,
    );
    (peer, socket, listener)
}

/// A peer with the built-in channels.
pub fn peer(config: Config) -> (TestPeer, Arc<MockSocket>, Arc<MockListener>) {
    let channels = Channels::new(&config.channel);
    peer_with_channels(config, channels)
}

/// An inbound packet as the demultiplexer would hand it over.
pub fn inbound(kind: PacketKind, sequence: u16) -> Packet {
    Packet {
        kind,
        sequence,
        payload: Bytes::new(),
    }
}
