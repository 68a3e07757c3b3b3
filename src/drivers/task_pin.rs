//! Core-pinned thread spawning for ESP32-S3 dual-core.
//!
//! The bridge server blocks in `accept()` and `write()`; it runs on its
//! own FreeRTOS task so that blocking is explicit and confined to one
//! thread.  On ESP-IDF, `esp_pthread_set_cfg()` configures affinity,
//! priority and stack for the *next* `std::thread::spawn` from the calling
//! thread, so the config→spawn pair must not interleave with other thread
//! creation.  On host targets only the name and stack size are applied.

use std::io;
use std::thread::JoinHandle;

/// CPU core identifiers for the ESP32-S3 Xtensa LX7 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU): protocol stacks (WiFi, lwIP).
    Pro = 0,
    /// Core 1 (APP_CPU): application logic.
    App = 1,
}

/// Thread placement for [`spawn_pinned`].
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
    /// Null-terminated task name, e.g. `"bridge\0"`.
    pub name: &'static str,
}

#[cfg(target_os = "espidf")]
pub fn spawn_pinned<F>(spec: TaskSpec, f: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    // SAFETY: esp_pthread_set_cfg copies the struct; `name` is 'static and
    // null-terminated so the pointer outlives the call.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = i32::from(spec.priority);
        cfg.stack_size = (spec.stack_kb * 1024) as _;
        cfg.thread_name = spec.name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
    }

    let display_name = spec.name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name,
        spec.core,
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
}

/// Simulation fallback; ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_pinned<F>(spec: TaskSpec, f: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let display_name = spec.name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        display_name,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
}
