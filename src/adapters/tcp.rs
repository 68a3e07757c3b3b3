//! TCP line-stream adapter.
//!
//! Implements [`Listener`] and [`Connection`] over blocking std sockets.
//! The listener binds `0.0.0.0:<port>`; on the device the socket is built
//! with raw lwIP calls so the accept backlog can be set (5 by default),
//! then handed to `std::net::TcpListener`.  On host targets std picks the
//! backlog.
//!
//! Accepted sockets are blocking with no timeouts.  The liveness check
//! flips the socket to non-blocking for a single read and back again.
//! EOF on that read only means the client shut down its sending side;
//! the connection keeps serving and the check is retired.  A dead peer
//! then surfaces as a failed send.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};

use log::{debug, info, warn};

use crate::app::ports::{Connection, Listener};
use crate::error::{ConnectionError, StartupError};

/// Inbound bytes are read and dropped in chunks of this size.
const DRAIN_CHUNK: usize = 64;

pub struct TcpLineListener {
    inner: TcpListener,
}

impl TcpLineListener {
    #[cfg(target_os = "espidf")]
    pub fn bind(port: u16, backlog: u8) -> Result<Self, StartupError> {
        use esp_idf_svc::sys::{
            AF_INET, SOCK_STREAM, in_addr, lwip_bind, lwip_close, lwip_htons, lwip_listen,
            lwip_socket, sockaddr_in,
        };
        use std::os::fd::FromRawFd;

        // SAFETY: lwIP socket call with valid domain/type/protocol.
        let fd = unsafe { lwip_socket(AF_INET as _, SOCK_STREAM as _, 0) };
        if fd < 0 {
            warn!("TCP: lwip_socket failed ({})", fd);
            return Err(StartupError::Socket(fd));
        }

        let addr = sockaddr_in {
            sin_len: 0,
            sin_family: AF_INET as _,
            // SAFETY: pure byte-order conversion.
            sin_port: unsafe { lwip_htons(port) },
            sin_addr: in_addr { s_addr: 0 }, // INADDR_ANY
            sin_zero: [0u8; 8],
        };

        // SAFETY: `addr` outlives the call; errors are checked.
        let rc = unsafe {
            lwip_bind(
                fd,
                core::ptr::addr_of!(addr).cast(),
                core::mem::size_of::<sockaddr_in>() as _,
            )
        };
        if rc < 0 {
            let kind = io::Error::last_os_error().kind();
            unsafe {
                lwip_close(fd);
            }
            warn!("TCP: lwip_bind on port {} failed ({})", port, rc);
            return Err(StartupError::Bind(kind));
        }

        // SAFETY: fd is a bound stream socket.
        let rc = unsafe { lwip_listen(fd, i32::from(backlog)) };
        if rc < 0 {
            unsafe {
                lwip_close(fd);
            }
            warn!("TCP: lwip_listen failed ({})", rc);
            return Err(StartupError::Listen(rc));
        }

        // SAFETY: fd is a valid listening socket owned by nobody else.
        let inner = unsafe { TcpListener::from_raw_fd(fd) };
        info!("TCP: listening on 0.0.0.0:{} (backlog {})", port, backlog);
        Ok(Self { inner })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn bind(port: u16, backlog: u8) -> Result<Self, StartupError> {
        let inner = TcpListener::bind(("0.0.0.0", port)).map_err(|e| {
            warn!("TCP: bind on port {} failed: {}", port, e);
            StartupError::Bind(e.kind())
        })?;
        let local = inner.local_addr().map_err(|e| StartupError::Bind(e.kind()))?;
        info!("TCP(sim): listening on {} (backlog {} requested)", local, backlog);
        Ok(Self { inner })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

impl Listener for TcpLineListener {
    type Conn = TcpConnection;

    fn accept(&mut self) -> Result<(TcpConnection, SocketAddr), ConnectionError> {
        let (stream, peer) = self
            .inner
            .accept()
            .map_err(|e| ConnectionError::Accept(e.kind()))?;

        // Accepted sockets may inherit flags from the listener on some stacks.
        stream
            .set_nonblocking(false)
            .and_then(|()| stream.set_write_timeout(None))
            .and_then(|()| stream.set_read_timeout(None))
            .map_err(|e| ConnectionError::Accept(e.kind()))?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("TCP: TCP_NODELAY not applied: {}", e);
        }

        Ok((
            TcpConnection {
                stream,
                read_closed: false,
            },
            peer,
        ))
    }
}

pub struct TcpConnection {
    stream: TcpStream,
    /// The peer shut down its sending side; nothing more to read.
    read_closed: bool,
}

impl TcpConnection {
    fn drain_inbound(&mut self) -> Result<(), ConnectionError> {
        let mut scratch = [0u8; DRAIN_CHUNK];
        loop {
            match self.stream.read(&mut scratch) {
                Ok(0) => {
                    debug!("TCP: peer half-closed, still serving");
                    self.read_closed = true;
                    return Ok(());
                }
                Ok(n) => debug!("TCP: dropped {} inbound bytes", n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(ConnectionError::Liveness(e.kind())),
            }
        }
    }
}

fn send_error(e: &io::Error) -> ConnectionError {
    match e.kind() {
        io::ErrorKind::WriteZero => ConnectionError::WriteZero,
        kind => ConnectionError::Send(kind),
    }
}

impl Connection for TcpConnection {
    fn send(&mut self, frame: &[u8]) -> Result<(), ConnectionError> {
        self.stream.write_all(frame).map_err(|e| send_error(&e))
    }

    fn probe(&mut self) -> Result<(), ConnectionError> {
        if self.read_closed {
            return Ok(());
        }
        self.stream
            .set_nonblocking(true)
            .map_err(|e| ConnectionError::Liveness(e.kind()))?;
        let result = self.drain_inbound();
        self.stream
            .set_nonblocking(false)
            .map_err(|e| ConnectionError::Liveness(e.kind()))?;
        result
    }

    fn close(self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            // NotConnected is expected once the peer has gone.
            debug!("TCP: shutdown: {}", e);
        }
    }
}
