//! Bridge configuration parameters
//!
//! All tunable parameters for the SliderBridge firmware.
//! Defaults describe the hardware build (multiplexed pots, 10 ms tick);
//! [`BridgeConfig::synthetic`] describes the random-value build (1 s tick).
//! Credentials and the channel source can be overridden at build time.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of channels a bridge can carry.
pub const MAX_CHANNELS: usize = 8;

/// Fixed listen port for the telemetry socket.
pub const DEFAULT_PORT: u16 = 8089;

/// Where channel values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelSource {
    /// Real potentiometers behind per-channel select lines and one shared ADC.
    Analog,
    /// Uniform random values, for bench testing without hardware.
    Synthetic,
}

impl ChannelSource {
    /// Analog sampling runs at 100 Hz; synthetic values change once a second.
    pub const fn default_tick_ms(self) -> u32 {
        match self {
            Self::Analog => 10,
            Self::Synthetic => 1000,
        }
    }
}

/// Core bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    // --- Network ---
    /// TCP listen port (all interfaces)
    pub port: u16,
    /// Listen backlog for pending connections
    pub backlog: u8,
    /// Station SSID
    pub wifi_ssid: heapless::String<32>,
    /// Station password (empty for an open network)
    pub wifi_password: heapless::String<64>,

    // --- Channels ---
    pub source: ChannelSource,
    /// Select-line GPIO per channel; also fixes channel count and wire order.
    pub select_gpios: heapless::Vec<i32, MAX_CHANNELS>,
    /// Settle time between raising a select line and sampling (microseconds)
    pub settle_us: u32,
    /// Upper bound of a channel reading (inclusive)
    pub value_max: u16,

    // --- Timing ---
    /// Delay between sampling steps (milliseconds)
    pub tick_interval_ms: u32,

    // --- Memory ---
    /// Free-heap low-water mark (bytes); below it a reclaim pass is forced
    pub low_water_mark_bytes: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let mut select_gpios = heapless::Vec::new();
        for gpio in crate::pins::SELECT_GPIOS {
            let _ = select_gpios.push(gpio);
        }

        let source = match option_env!("SLIDERBRIDGE_SOURCE") {
            Some("synthetic") => ChannelSource::Synthetic,
            _ => ChannelSource::Analog,
        };

        Self {
            // Network
            port: DEFAULT_PORT,
            backlog: 5,
            wifi_ssid: bounded(option_env!("SLIDERBRIDGE_WIFI_SSID").unwrap_or("ssid")),
            wifi_password: bounded(option_env!("SLIDERBRIDGE_WIFI_PASS").unwrap_or("")),

            // Channels
            source,
            select_gpios,
            settle_us: 10,
            value_max: 1023,

            // Timing
            tick_interval_ms: source.default_tick_ms(),

            // Memory
            low_water_mark_bytes: 102_000,
        }
    }
}

impl BridgeConfig {
    /// Random-value bench build: same channel count, 1 s tick.
    pub fn synthetic() -> Self {
        Self {
            source: ChannelSource::Synthetic,
            tick_interval_ms: ChannelSource::Synthetic.default_tick_ms(),
            ..Self::default()
        }
    }

    /// Number of channels carried on the wire.
    pub fn channel_count(&self) -> usize {
        self.select_gpios.len()
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ValidationFailed("port must be non-zero"));
        }
        if self.backlog == 0 {
            return Err(ConfigError::ValidationFailed("backlog must be at least 1"));
        }
        if self.select_gpios.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "at least one channel is required",
            ));
        }
        if self.value_max == 0 {
            return Err(ConfigError::ValidationFailed("value_max must be non-zero"));
        }
        if self.settle_us > 1000 {
            return Err(ConfigError::ValidationFailed("settle_us must be 0–1000"));
        }
        if !(1..=60_000).contains(&self.tick_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms must be 1–60000",
            ));
        }
        if self.low_water_mark_bytes == 0 {
            return Err(ConfigError::ValidationFailed(
                "low_water_mark_bytes must be non-zero",
            ));
        }
        Ok(())
    }
}

fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Configuration rejected at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
