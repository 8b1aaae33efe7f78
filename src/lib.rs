#![deny(clippy::expect_used, clippy::unwrap_used)]

//! A per-peer reliable UDP engine.
//!
//! Each remote endpoint gets a [`Peer`](core::peer::Peer) that multiplexes
//! four delivery guarantees over one datagram socket, paces output with an
//! RTT-driven flow controller and recycles packets through a shared pool.
//!
//! 基于 UDP 的单对端可靠传输引擎。每个远端对应一个 `Peer`，它在同一个数据报
//! 套接字上复用四种交付保证，以 RTT 驱动的流量控制器调节发送速率，并通过
//! 共享包池回收包。

pub mod channel;
pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod listener;
pub mod packet;
pub mod socket;

pub use crate::core::peer::{DeliveryMethod, Peer, PeerHandle};
pub use crate::error::{Error, Result};
