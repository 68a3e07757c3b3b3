//! Blocking delay for the server thread.
//!
//! `std::thread::sleep` maps to `vTaskDelay` under ESP-IDF, so the tick
//! sleep yields the core instead of spinning.  Sub-tick waits (the
//! select-line settle time) are too short for the scheduler and busy-wait
//! on the monotonic clock instead.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// Waits shorter than this spin rather than sleep.
const SPIN_BELOW_NS: u32 = 1_000_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        let wait = Duration::from_nanos(u64::from(ns));
        if ns < SPIN_BELOW_NS {
            let start = Instant::now();
            while start.elapsed() < wait {
                core::hint::spin_loop();
            }
        } else {
            std::thread::sleep(wait);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
