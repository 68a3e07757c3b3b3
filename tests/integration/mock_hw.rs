//! Mock adapters for integration tests.
//!
//! Every mock that takes part in a serve cycle writes into one shared
//! [`Trace`], so tests can assert on the exact interleaving of probes,
//! sends and tick delays without touching real sockets or pins.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use sliderbridge::app::events::BridgeEvent;
use sliderbridge::app::ports::{ChannelReader, Connection, EventSink, Listener, MemoryPort};
use sliderbridge::error::ConnectionError;

// ── Shared call trace ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Probe(u8),
    Send(u8, String),
    Close(u8),
    DelayMs(u32),
}

pub type Trace = Rc<RefCell<Vec<Op>>>;

pub fn new_trace() -> Trace {
    Rc::default()
}

/// Frames sent on connection `id`, as text.
pub fn frames_for(trace: &Trace, id: u8) -> Vec<String> {
    trace
        .borrow()
        .iter()
        .filter_map(|op| match op {
            Op::Send(conn, text) if *conn == id => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn delay_count(trace: &Trace) -> usize {
    trace
        .borrow()
        .iter()
        .filter(|op| matches!(op, Op::DelayMs(_)))
        .count()
}

pub fn peer(port: u16) -> SocketAddr {
    SocketAddr::from(([192, 168, 1, 50], port))
}

// ── ScriptedReader ────────────────────────────────────────────

/// Plays back one row per sampling step; the last row repeats forever.
pub struct ScriptedReader {
    rows: Vec<Vec<u16>>,
    step: usize,
    panic_at_step: Option<usize>,
}

#[allow(dead_code)]
impl ScriptedReader {
    pub fn new(rows: &[&[u16]]) -> Self {
        Self {
            rows: rows.iter().map(|r| r.to_vec()).collect(),
            step: 0,
            panic_at_step: None,
        }
    }

    pub fn constant(row: &[u16]) -> Self {
        Self::new(&[row])
    }

    /// Panic while sampling step `step` (zero-based).
    pub fn panicking_at(mut self, step: usize) -> Self {
        self.panic_at_step = Some(step);
        self
    }

    pub fn steps_taken(&self) -> usize {
        self.step
    }
}

impl ChannelReader for ScriptedReader {
    fn read_channel(&mut self, index: usize) -> u16 {
        if self.panic_at_step == Some(self.step) {
            self.panic_at_step = None;
            panic!("adc read fault on channel {index}");
        }
        let row = &self.rows[self.step.min(self.rows.len() - 1)];
        let value = row[index];
        if index == row.len() - 1 {
            self.step += 1;
        }
        value
    }
}

// ── MockConnection ────────────────────────────────────────────

/// Scripted client.  `hangup_after` liveness checks succeed, then the
/// socket reports a reset.
pub struct MockConnection {
    id: u8,
    trace: Trace,
    probes: usize,
    sends: usize,
    hangup_after: usize,
    fail_send_after: Option<usize>,
}

#[allow(dead_code)]
impl MockConnection {
    pub fn new(id: u8, trace: &Trace, hangup_after: usize) -> Self {
        Self {
            id,
            trace: trace.clone(),
            probes: 0,
            sends: 0,
            hangup_after,
            fail_send_after: None,
        }
    }

    /// The send after `n` successful ones fails with a broken pipe.
    pub fn failing_send_after(mut self, n: usize) -> Self {
        self.fail_send_after = Some(n);
        self
    }
}

impl Connection for MockConnection {
    fn send(&mut self, frame: &[u8]) -> Result<(), ConnectionError> {
        if self.fail_send_after == Some(self.sends) {
            return Err(ConnectionError::Send(std::io::ErrorKind::BrokenPipe));
        }
        self.sends += 1;
        let text = String::from_utf8_lossy(frame).into_owned();
        self.trace.borrow_mut().push(Op::Send(self.id, text));
        Ok(())
    }

    fn probe(&mut self) -> Result<(), ConnectionError> {
        self.trace.borrow_mut().push(Op::Probe(self.id));
        if self.probes >= self.hangup_after {
            return Err(ConnectionError::Liveness(std::io::ErrorKind::ConnectionReset));
        }
        self.probes += 1;
        Ok(())
    }

    fn close(self) {
        self.trace.borrow_mut().push(Op::Close(self.id));
    }
}

// ── MockListener ──────────────────────────────────────────────

pub type AcceptResult = Result<(MockConnection, SocketAddr), ConnectionError>;

/// Hands out queued accept results; an empty queue reports `WouldBlock`.
#[derive(Default)]
pub struct MockListener {
    queue: VecDeque<AcceptResult>,
}

#[allow(dead_code)]
impl MockListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, conn: MockConnection, addr: SocketAddr) -> Self {
        self.queue.push_back(Ok((conn, addr)));
        self
    }

    pub fn with_error(mut self, e: ConnectionError) -> Self {
        self.queue.push_back(Err(e));
        self
    }
}

impl Listener for MockListener {
    type Conn = MockConnection;

    fn accept(&mut self) -> AcceptResult {
        self.queue
            .pop_front()
            .unwrap_or(Err(ConnectionError::Accept(std::io::ErrorKind::WouldBlock)))
    }
}

// ── FakeHeap ──────────────────────────────────────────────────

/// Reports a fixed free figure; reclaim restores `after_reclaim`.
pub struct FakeHeap {
    pub free: u32,
    pub after_reclaim: u32,
    pub reclaims: u32,
}

impl FakeHeap {
    pub fn new(free: u32) -> Self {
        Self {
            free,
            after_reclaim: 180_000,
            reclaims: 0,
        }
    }
}

impl MemoryPort for FakeHeap {
    fn free_bytes(&self) -> u32 {
        self.free
    }

    fn reclaim(&mut self) {
        self.reclaims += 1;
        self.free = self.after_reclaim;
    }
}

// ── TraceDelay ────────────────────────────────────────────────

/// Records tick sleeps without sleeping.
pub struct TraceDelay {
    trace: Trace,
    pub calls: Rc<Cell<u32>>,
}

impl TraceDelay {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            calls: Rc::default(),
        }
    }
}

impl DelayNs for TraceDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.set(self.calls.get() + 1);
        self.trace.borrow_mut().push(Op::DelayMs(ms));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<BridgeEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &BridgeEvent) {
        self.events.push(event.clone());
    }
}
