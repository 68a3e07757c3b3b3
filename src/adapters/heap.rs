//! Heap adapter.
//!
//! Implements [`MemoryPort`] over the ESP-IDF heap.  There is no collector
//! to run, so `reclaim()` gives the network stack time to release the
//! buffers of connections that were just closed: lwIP frees TIME_WAIT
//! PCBs from its own timer task, which needs the CPU for a moment.
//!
//! On host targets the heap is simulated: the free count is whatever the
//! test last set, and `reclaim()` restores the baseline.

use log::info;

use crate::app::ports::MemoryPort;

/// How long `reclaim()` yields to the network stack.
pub const RECLAIM_YIELD_MS: u32 = 250;

#[cfg(target_os = "espidf")]
pub struct HeapAdapter {
    yield_ms: u32,
    reclaims: u32,
}

#[cfg(target_os = "espidf")]
impl HeapAdapter {
    pub fn new() -> Self {
        Self {
            yield_ms: RECLAIM_YIELD_MS,
            reclaims: 0,
        }
    }

    pub fn reclaims(&self) -> u32 {
        self.reclaims
    }

    /// Smallest free-heap figure seen since boot.
    pub fn min_free_bytes(&self) -> u32 {
        // SAFETY: read-only heap statistics query.
        unsafe { esp_idf_svc::sys::esp_get_minimum_free_heap_size() }
    }
}

#[cfg(target_os = "espidf")]
impl MemoryPort for HeapAdapter {
    fn free_bytes(&self) -> u32 {
        // SAFETY: read-only heap statistics query.
        unsafe { esp_idf_svc::sys::esp_get_free_heap_size() }
    }

    fn reclaim(&mut self) {
        let before = self.free_bytes();
        std::thread::sleep(std::time::Duration::from_millis(u64::from(self.yield_ms)));
        self.reclaims += 1;
        info!(
            "Heap: reclaim #{} free {} -> {} bytes (min {})",
            self.reclaims,
            before,
            self.free_bytes(),
            self.min_free_bytes()
        );
    }
}

// ── Simulation ────────────────────────────────────────────────

/// Free bytes reported by a fresh simulated heap.
#[cfg(not(target_os = "espidf"))]
pub const SIM_BASELINE_FREE: u32 = 200_000;

#[cfg(not(target_os = "espidf"))]
pub struct HeapAdapter {
    free: u32,
    baseline: u32,
    reclaims: u32,
}

#[cfg(not(target_os = "espidf"))]
impl HeapAdapter {
    pub fn new() -> Self {
        Self::with_baseline(SIM_BASELINE_FREE)
    }

    pub fn with_baseline(baseline: u32) -> Self {
        Self {
            free: baseline,
            baseline,
            reclaims: 0,
        }
    }

    pub fn reclaims(&self) -> u32 {
        self.reclaims
    }

    /// Set the simulated free-heap figure (host only).
    pub fn sim_set_free(&mut self, free: u32) {
        self.free = free;
    }
}

#[cfg(not(target_os = "espidf"))]
impl MemoryPort for HeapAdapter {
    fn free_bytes(&self) -> u32 {
        self.free
    }

    fn reclaim(&mut self) {
        let before = self.free;
        self.free = self.baseline;
        self.reclaims += 1;
        info!("Heap(sim): reclaim #{} free {} -> {} bytes", self.reclaims, before, self.free);
    }
}

impl Default for HeapAdapter {
    fn default() -> Self {
        Self::new()
    }
}
