//! The per-peer engine: flow control, RTT tracking and the peer orchestrator.
//! 每个对端的引擎：流量控制、RTT 跟踪以及对端编排器。

pub mod flow;
pub mod peer;
pub mod rtt;

#[cfg(test)]
pub mod test_utils;
