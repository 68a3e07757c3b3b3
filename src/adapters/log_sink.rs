//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing bridge events to the logger
//! (UART / USB-CDC on the device, stderr on host).  One line per event,
//! `TAG | key=value` so the console can be grepped.

use log::{debug, info, warn};

use crate::app::events::BridgeEvent;
use crate::app::ports::EventSink;
use crate::error::ServeError;

/// Adapter that logs every [`BridgeEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::Started { channels, tick_ms } => {
                info!("START | channels={} | tick={}ms", channels, tick_ms);
            }
            BridgeEvent::Reclaimed { free_before, free_after } => {
                info!("HEAP | reclaimed | free {} -> {} bytes", free_before, free_after);
            }
            BridgeEvent::ClientConnected(peer) => {
                info!("CONN | peer={}", peer);
            }
            // Up to 100 of these a second; keep them below the default level.
            BridgeEvent::FrameSent { bytes } => {
                debug!("FRAME | bytes={}", bytes);
            }
            BridgeEvent::ServeEnded { error: ServeError::Fault(msg), closed } => {
                warn!("FAULT | {} | closed={}", msg, closed);
            }
            BridgeEvent::ServeEnded { error: ServeError::Connection(e), closed } => {
                info!("CONN | ended: {} | closed={}", e, closed);
            }
        }
    }
}
