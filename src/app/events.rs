//! Outbound bridge events.
//!
//! The [`BridgeServer`](super::server::BridgeServer) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  The log adapter turns them
//! into single-line records; tests record them to assert on the lifecycle.

use std::net::SocketAddr;

use crate::error::ServeError;

/// Structured events emitted by the bridge core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The server is about to enter its accept loop.
    Started { channels: usize, tick_ms: u32 },

    /// Free heap was below the low-water mark; a reclaim pass ran.
    Reclaimed { free_before: u32, free_after: u32 },

    /// A client was accepted and is now being served.
    ClientConnected(SocketAddr),

    /// A changed snapshot was written to the client.
    FrameSent { bytes: usize },

    /// The serve cycle ended; `closed` is true when a live connection was
    /// torn down as part of recovery.
    ServeEnded { error: ServeError, closed: bool },
}
