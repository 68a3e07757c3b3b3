//! Low-level drivers: raw peripheral setup and task placement.
//!
//! Each driver compiles on host targets with simulation stubs; the
//! ESP-IDF paths are gated on `target_os = "espidf"`.

pub mod hw_init;
pub mod task_pin;
