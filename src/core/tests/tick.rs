//! Tests for the per-tick drain loop, flow budget, pings and RTT reset.

use crate::{
    config::{Config, FlowControlConfig},
    core::{
        peer::DeliveryMethod,
        test_utils::{MockChannel, MockChannels, inbound, peer, peer_with_channels},
    },
    packet::PacketKind,
};
use std::time::Duration;

fn two_per_window() -> Config {
    Config {
        flow_control: FlowControlConfig {
            bad_mode_ceiling: 2,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_drain_follows_fixed_priority() {
    let mocks = MockChannels::new();
    let mut channels = mocks.channels();
    channels.reliable_ordered = Box::new(
        MockChannel::new(mocks.reliable_ordered.clone()).with_ready(PacketKind::ReliableOrdered, b"ro"),
    );
    channels.reliable =
        Box::new(MockChannel::new(mocks.reliable.clone()).with_ready(PacketKind::Reliable, b"r"));
    channels.sequenced =
        Box::new(MockChannel::new(mocks.sequenced.clone()).with_ready(PacketKind::Sequenced, b"s"));
    let (mut peer, socket, _listener) = peer_with_channels(two_per_window(), channels);
    peer.send(&b"plain"[..], DeliveryMethod::Unreliable).unwrap();

    peer.update(Duration::from_millis(100));
    assert_eq!(
        socket.sent_kinds(),
        vec![PacketKind::ReliableOrdered, PacketKind::Reliable]
    );

    peer.update(Duration::from_millis(100));
    assert_eq!(
        socket.sent_kinds(),
        vec![
            PacketKind::ReliableOrdered,
            PacketKind::Reliable,
            PacketKind::Sequenced,
            PacketKind::None
        ]
    );
}

#[test]
fn test_plain_queue_is_fifo() {
    let (mut peer, socket, _listener) = peer(Config::default());
    peer.send_packet(peer.pool().acquire(PacketKind::Connect)).unwrap();
    peer.send_packet(inbound(PacketKind::AckReliable, 3)).unwrap();
    peer.send_packet(inbound(PacketKind::Disconnect, 0)).unwrap();

    peer.update(Duration::from_millis(100));
    assert_eq!(
        socket.sent_kinds(),
        vec![PacketKind::Connect, PacketKind::AckReliable, PacketKind::Disconnect]
    );
}

#[test]
fn test_budget_limits_sends_per_tick() {
    let (mut peer, socket, _listener) = peer(Config::default());
    for _ in 0..20 {
        peer.send(&b"x"[..], DeliveryMethod::Unreliable).unwrap();
    }

    // Bad mode: 16 per 100ms, pro-rated to 8 over 50ms.
    peer.update(Duration::from_millis(50));
    assert_eq!(socket.sent().len(), 8);
    assert_eq!(peer.flow().sent_this_window(), 8);

    // 8 left in this window, but 49ms only pro-rates to 7.
    peer.update(Duration::from_millis(49));
    assert_eq!(socket.sent().len(), 15);

    // The window rolls once 100ms have elapsed.
    peer.update(Duration::from_millis(1));
    assert_eq!(socket.sent().len(), 15);
    assert_eq!(peer.flow().sent_this_window(), 0);

    peer.update(Duration::from_millis(100));
    assert_eq!(socket.sent().len(), 20);
}

#[test]
fn test_socket_failure_aborts_tick() {
    let config = Config {
        ping_interval: Duration::from_millis(100),
        ..Default::default()
    };
    let (mut peer, socket, listener) = peer(config);
    peer.send(&b"a"[..], DeliveryMethod::Unreliable).unwrap();
    peer.send(&b"b"[..], DeliveryMethod::Unreliable).unwrap();
    socket.set_failing(true);

    peer.update(Duration::from_millis(100));
    assert_eq!(listener.send_error_count(), 1);
    assert_eq!(peer.flow().sent_this_window(), 0);
    // The ping step never ran.
    assert_eq!(peer.ping_sequence(), 0);

    socket.set_failing(false);
    peer.update(Duration::from_millis(100));
    // The failed packet was unreliable and is gone; the second one goes out, then the ping.
    assert_eq!(socket.sent_kinds(), vec![PacketKind::None, PacketKind::Ping]);
    assert_eq!(listener.send_error_count(), 1);
}

#[test]
fn test_ping_schedule_and_recycling() {
    let config = Config {
        ping_interval: Duration::from_millis(30),
        ..Default::default()
    };
    let (mut peer, socket, _listener) = peer(config);

    peer.update(Duration::from_millis(20));
    assert!(socket.sent().is_empty());
    peer.update(Duration::from_millis(10));
    peer.update(Duration::from_millis(30));

    let pings = socket.sent();
    assert_eq!(pings.iter().map(|p| p.kind).collect::<Vec<_>>(), vec![PacketKind::Ping; 2]);
    assert_eq!(pings.iter().map(|p| p.sequence).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(peer.ping_sequence(), 2);
    // One instance serves every ping.
    assert_eq!(peer.pool().available(), 1);
}

#[test]
fn test_ping_failure_is_reported() {
    let config = Config {
        ping_interval: Duration::from_millis(10),
        ..Default::default()
    };
    let (mut peer, socket, listener) = peer(config);
    socket.set_failing(true);
    peer.update(Duration::from_millis(10));
    assert_eq!(peer.ping_sequence(), 1);
    assert_eq!(listener.send_error_count(), 1);
}

#[test]
fn test_rtt_accumulator_resets_but_average_persists() {
    let config = Config {
        ping_interval: Duration::from_millis(100),
        ..Default::default()
    };
    let (mut peer, _socket, _listener) = peer(config);
    peer.update(Duration::from_millis(100));
    peer.update(Duration::from_millis(60));
    peer.process_packet(inbound(PacketKind::Pong, 1));
    assert_eq!(peer.rtt().sample_count(), 1);

    // 160ms elapsed so far; the accumulator clears at 1000ms.
    for _ in 0..8 {
        peer.update(Duration::from_millis(100));
    }
    assert_eq!(peer.rtt().sample_count(), 1);
    peer.update(Duration::from_millis(40));
    assert_eq!(peer.rtt().sample_count(), 0);
    assert_eq!(peer.average_rtt(), Duration::from_millis(60));
}

#[test]
fn test_channels_advance_every_tick() {
    let mocks = MockChannels::new();
    let (mut peer, _socket, _listener) = peer_with_channels(Config::default(), mocks.channels());
    peer.update(Duration::from_millis(5));
    peer.update(Duration::from_millis(7));
    assert_eq!(
        *mocks.reliable.advanced.lock().unwrap(),
        vec![Duration::from_millis(5), Duration::from_millis(7)]
    );
    assert_eq!(mocks.sequenced.advanced.lock().unwrap().len(), 2);
    assert_eq!(mocks.reliable_ordered.advanced.lock().unwrap().len(), 2);
}
