//! Connection server: the bridge control loop.
//!
//! [`BridgeServer`] owns the listener, the sampler, the memory port and
//! the tick delay.  It serves exactly one client at a time:
//!
//! ```text
//!            ┌────────────── Listening ◀───────────────┐
//!            │  guardian.maybe_reclaim()                │
//!            │  listener.accept()  ──err──────────────▶ │
//!            ▼                                          │
//!         Serving                                       │
//!   ┌─▶ probe ─▶ sample_all ─▶ dirty? encode + send ─┐  │
//!   └──────────── delay(tick) ◀──────────────────────┘  │
//!            │ any ServeError: close, log ──────────────┘
//! ```
//!
//! Nothing that happens inside a serve cycle stops the loop.  Panics
//! raised by an adapter mid-cycle are caught at the cycle boundary and
//! reported as [`ServeError::Fault`].

use std::panic::{AssertUnwindSafe, catch_unwind};

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::error::ServeError;
use crate::wire;

use super::events::BridgeEvent;
use super::guardian::MemoryGuardian;
use super::ports::{ChannelReader, Connection, EventSink, Listener, MemoryPort};
use super::sampler::Sampler;

// ───────────────────────────────────────────────────────────────
// Server state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No client attached; the next step is an accept.
    Listening,
    /// One client attached and receiving frames.
    Serving,
}

/// Counters kept across connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub connections: u32,
    pub frames_sent: u64,
    pub faults: u32,
}

// ───────────────────────────────────────────────────────────────
// BridgeServer
// ───────────────────────────────────────────────────────────────

pub struct BridgeServer<L, R, M, D, S>
where
    L: Listener,
    R: ChannelReader,
    M: MemoryPort,
    D: DelayNs,
    S: EventSink,
{
    listener: L,
    sampler: Sampler<R>,
    guardian: MemoryGuardian,
    memory: M,
    delay: D,
    sink: S,
    tick_ms: u32,
    state: ServerState,
    stats: ServerStats,
}

impl<L, R, M, D, S> BridgeServer<L, R, M, D, S>
where
    L: Listener,
    R: ChannelReader,
    M: MemoryPort,
    D: DelayNs,
    S: EventSink,
{
    pub fn new(
        listener: L,
        sampler: Sampler<R>,
        guardian: MemoryGuardian,
        memory: M,
        delay: D,
        sink: S,
        tick_ms: u32,
    ) -> Self {
        Self {
            listener,
            sampler,
            guardian,
            memory,
            delay,
            sink,
            tick_ms,
            state: ServerState::Listening,
            stats: ServerStats::default(),
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn stats(&self) -> ServerStats {
        self.stats
    }

    pub fn sampler(&self) -> &Sampler<R> {
        &self.sampler
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Serve clients forever.
    pub fn run(&mut self) -> ! {
        self.sink.emit(&BridgeEvent::Started {
            channels: self.sampler.channel_count(),
            tick_ms: self.tick_ms,
        });
        info!(
            "Server: {} channels, tick {} ms, low-water mark {} B",
            self.sampler.channel_count(),
            self.tick_ms,
            self.guardian.low_water_mark()
        );
        loop {
            self.run_once();
        }
    }

    /// One outer iteration: guard the heap, accept, serve until failure.
    ///
    /// Returns the error that ended the cycle after it has been handled,
    /// for callers that want to inspect it; the server is back in
    /// [`ServerState::Listening`] either way.
    pub fn run_once(&mut self) -> ServeError {
        self.state = ServerState::Listening;
        self.guardian.maybe_reclaim(&mut self.memory, &mut self.sink);

        let (mut conn, peer) = match self.listener.accept() {
            Ok(accepted) => accepted,
            Err(e) => {
                let error = ServeError::Connection(e);
                self.recover(error.clone(), false);
                return error;
            }
        };

        self.state = ServerState::Serving;
        self.stats.connections += 1;
        info!("Server: got a new connection from {}", peer);
        self.sink.emit(&BridgeEvent::ClientConnected(peer));

        let error = match catch_unwind(AssertUnwindSafe(|| self.serve(&mut conn))) {
            Ok(e) => e,
            Err(payload) => ServeError::fault(panic_message(payload.as_ref())),
        };

        conn.close();
        self.recover(error.clone(), true);
        error
    }

    // ── Serving ───────────────────────────────────────────────

    /// Inner loop; only returns on failure.
    fn serve(&mut self, conn: &mut L::Conn) -> ServeError {
        loop {
            if let Err(e) = self.step(conn) {
                return e;
            }
            self.delay.delay_ms(self.tick_ms);
        }
    }

    /// One sampling tick: probe, sample, push on change.
    fn step(&mut self, conn: &mut L::Conn) -> Result<(), ServeError> {
        conn.probe()?;

        let snapshot = self.sampler.sample_all();
        if !snapshot.dirty {
            return Ok(());
        }

        let frame = wire::encode(&snapshot);
        conn.send(&frame)?;
        self.stats.frames_sent += 1;
        self.sink.emit(&BridgeEvent::FrameSent { bytes: frame.len() });
        Ok(())
    }

    // ── Recovery ──────────────────────────────────────────────

    fn recover(&mut self, error: ServeError, closed: bool) {
        match &error {
            ServeError::Connection(e) if closed => {
                info!("Server: connection closed ({})", e);
            }
            ServeError::Connection(e) => {
                warn!("Server: accept failed ({})", e);
            }
            ServeError::Fault(msg) => {
                self.stats.faults += 1;
                warn!("Server: error: {}", msg);
            }
        }
        self.sink.emit(&BridgeEvent::ServeEnded { error, closed });
        self.state = ServerState::Listening;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}
