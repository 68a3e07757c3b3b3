//! Memory guardian: proactive heap reclamation between clients.
//!
//! Each accept cycle churns socket buffers and connection state.  On a
//! small heap that churn fragments memory over time, so before every
//! accept the guardian compares free heap against a fixed low-water mark
//! and forces a reclaim pass when it is strictly below it.

use log::info;

use super::events::BridgeEvent;
use super::ports::{EventSink, MemoryPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryGuardian {
    low_water_mark: u32,
}

impl MemoryGuardian {
    pub fn new(low_water_mark: u32) -> Self {
        Self { low_water_mark }
    }

    pub fn low_water_mark(&self) -> u32 {
        self.low_water_mark
    }

    /// Reclaim if free memory is strictly below the low-water mark.
    pub fn maybe_reclaim(&self, mem: &mut impl MemoryPort, sink: &mut impl EventSink) {
        let free_before = mem.free_bytes();
        if free_before >= self.low_water_mark {
            return;
        }

        mem.reclaim();
        let free_after = mem.free_bytes();
        info!(
            "Guardian: free heap {} < {}, reclaimed to {}",
            free_before, self.low_water_mark, free_after
        );
        sink.emit(&BridgeEvent::Reclaimed {
            free_before,
            free_after,
        });
    }
}
