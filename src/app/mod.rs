//! Bridge core: pure control logic, zero direct I/O.
//!
//! Sampling, change detection, heap guarding, and the single-client
//! serve loop live here.  All interaction with pins, sockets and the
//! allocator happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod guardian;
pub mod ports;
pub mod sampler;
pub mod server;
