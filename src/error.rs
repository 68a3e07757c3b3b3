//! Error taxonomy for the bridge control loop.
//!
//! Two runtime tiers, both routed back to the Listening state by the
//! server: [`ConnectionError`] for anything scoped to the socket and
//! [`ServeError::Fault`] for everything else.  [`StartupError`] is the
//! only category allowed to stop the process.
//!
//! All variants are `Copy` or own a small fixed-capacity message so they
//! can be logged and dropped without touching the heap.

use core::fmt;

// ---------------------------------------------------------------------------
// Connection-scoped failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    /// `accept()` returned an error.
    Accept(std::io::ErrorKind),
    /// Writing a frame failed (peer reset, broken pipe, ...).
    Send(std::io::ErrorKind),
    /// The per-tick liveness check hit a socket error (reset, ...).
    Liveness(std::io::ErrorKind),
    /// The write accepted zero bytes.
    WriteZero,
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept(kind) => write!(f, "accept failed: {kind}"),
            Self::Send(kind) => write!(f, "send failed: {kind}"),
            Self::Liveness(kind) => write!(f, "liveness check failed: {kind}"),
            Self::WriteZero => write!(f, "socket accepted zero bytes"),
        }
    }
}

// ---------------------------------------------------------------------------
// Serve-cycle failures
// ---------------------------------------------------------------------------

/// Why a serve cycle ended.  The server loop never propagates these; it
/// logs them and returns to Listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeError {
    /// Socket-level failure; the connection (if any) is closed.
    Connection(ConnectionError),
    /// Anything else that went wrong inside the cycle.
    Fault(heapless::String<64>),
}

impl ServeError {
    /// Build a [`ServeError::Fault`], truncating the message to fit.
    pub fn fault(msg: &str) -> Self {
        let mut s = heapless::String::new();
        for c in msg.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
        Self::Fault(s)
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "connection: {e}"),
            Self::Fault(msg) => write!(f, "fault: {msg}"),
        }
    }
}

impl From<ConnectionError> for ServeError {
    fn from(e: ConnectionError) -> Self {
        Self::Connection(e)
    }
}

// ---------------------------------------------------------------------------
// Startup failures (fatal)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupError {
    /// Socket creation failed.
    Socket(i32),
    /// Binding the listen port failed.
    Bind(std::io::ErrorKind),
    /// `listen()` failed.
    Listen(i32),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socket(rc) => write!(f, "socket creation failed (rc={rc})"),
            Self::Bind(kind) => write!(f, "bind failed: {kind}"),
            Self::Listen(rc) => write!(f, "listen failed (rc={rc})"),
        }
    }
}

impl std::error::Error for StartupError {}
