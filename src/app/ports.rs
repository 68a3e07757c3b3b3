//! Port traits: the hexagonal boundary between the bridge core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Sampler / Guardian / BridgeServer (domain)
//! ```
//!
//! Driven adapters (ADC mux, random source, heap monitor, TCP socket, log
//! sink) implement these traits.  The core consumes them via generics, so
//! it never touches hardware or sockets directly.  The inter-tick sleep
//! and the ADC settle wait use [`embedded_hal::delay::DelayNs`] rather
//! than a port of their own.

use std::net::SocketAddr;

use crate::error::ConnectionError;

// ───────────────────────────────────────────────────────────────
// Channel port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: obtain one channel's current value.
///
/// Reads cannot fail; a hardware source that cannot sample returns
/// its last good value or zero.
pub trait ChannelReader {
    /// Sample channel `index` and return a value in `0..=value_max`.
    fn read_channel(&mut self, index: usize) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Memory port (driven adapter: allocator ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Process-wide free-memory query and forced reclamation.
pub trait MemoryPort {
    /// Bytes of heap currently free.
    fn free_bytes(&self) -> u32;

    /// Run a full reclamation pass now.
    fn reclaim(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Socket ports (driven adapter: domain → network)
// ───────────────────────────────────────────────────────────────

/// A bound listening socket that hands out one client at a time.
pub trait Listener {
    type Conn: Connection;

    /// Block until a client connects.
    fn accept(&mut self) -> Result<(Self::Conn, SocketAddr), ConnectionError>;
}

/// One accepted client.  Push-only: the bridge never reads payload.
pub trait Connection {
    /// Write the whole frame, blocking until it is handed to the stack.
    fn send(&mut self, frame: &[u8]) -> Result<(), ConnectionError>;

    /// Cheap liveness check, called once per tick.
    /// Returns [`ConnectionError::Liveness`] once the socket is known dead.
    /// A peer that only closed its sending side is still a receiver.
    fn probe(&mut self) -> Result<(), ConnectionError> {
        Ok(())
    }

    /// Tear the connection down.
    fn close(self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent);
}
