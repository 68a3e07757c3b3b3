//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                    |
//! |-------------|--------------------|--------------------------------|
//! | `analog`    | ChannelReader      | Shared ADC + select lines      |
//! | `synthetic` | ChannelReader      | Seeded random generator        |
//! | `heap`      | MemoryPort         | ESP-IDF heap / simulated heap  |
//! | `tcp`       | Listener           | lwIP / std TCP sockets         |
//! |             | Connection         |                                |
//! | `log_sink`  | EventSink          | Serial log output              |
//! | `wifi`      | ConnectivityPort   | ESP-IDF WiFi STA               |
//! | `delay`     | DelayNs            | FreeRTOS / std sleep           |

pub mod analog;
pub mod delay;
pub mod heap;
pub mod log_sink;
pub mod synthetic;
pub mod tcp;
pub mod wifi;
