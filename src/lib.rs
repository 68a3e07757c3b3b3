//! SliderBridge firmware library.
//!
//! Streams slider positions to a single TCP client as `v0|v1|...\r\n`
//! lines.  Exposes the pure-logic core and the adapters for integration
//! testing; all ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod wire;

pub mod adapters;
pub mod drivers;
