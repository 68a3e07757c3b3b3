//! SliderBridge Firmware: Main Entry Point
//!
//! Hexagonal layout: a pure bridge core driven through port traits.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  MuxAnalogReader / SyntheticReader   TcpLineListener           │
//! │  (ChannelReader)                     (Listener + Connection)   │
//! │  HeapAdapter      LogEventSink       WifiAdapter     StdDelay  │
//! │  (MemoryPort)     (EventSink)        (Connectivity)  (DelayNs) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              BridgeServer (pure logic)                 │    │
//! │  │  Sampler · MemoryGuardian · wire encoder               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot order: logger, config, peripherals, WiFi, bind.  Any failure up
//! to and including bind is fatal.  After that the server runs forever on
//! its own thread.
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Result, anyhow};
use log::info;

use sliderbridge::adapters::analog::MuxAnalogReader;
use sliderbridge::adapters::delay::StdDelay;
use sliderbridge::adapters::heap::HeapAdapter;
use sliderbridge::adapters::log_sink::LogEventSink;
use sliderbridge::adapters::synthetic::SyntheticReader;
use sliderbridge::adapters::tcp::TcpLineListener;
use sliderbridge::adapters::wifi::{ConnectivityPort, WifiAdapter};
use sliderbridge::app::guardian::MemoryGuardian;
use sliderbridge::app::ports::ChannelReader;
use sliderbridge::app::sampler::Sampler;
use sliderbridge::app::server::BridgeServer;
use sliderbridge::config::{BridgeConfig, ChannelSource};
use sliderbridge::drivers::hw_init::{self, SelectLine, SliderAdc};
use sliderbridge::drivers::task_pin::{Core, TaskSpec, spawn_pinned};

/// The server blocks in accept/write; keep it off the protocol core.
const SERVER_TASK: TaskSpec = TaskSpec {
    core: Core::App,
    priority: 5,
    stack_kb: 16,
    name: "bridge\0",
};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SliderBridge v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = BridgeConfig::default();
    config.validate()?;
    info!(
        "Config: source={:?} channels={} port={} tick={}ms",
        config.source,
        config.channel_count(),
        config.port,
        config.tick_interval_ms
    );

    // ── 3. Peripherals ────────────────────────────────────────
    if config.source == ChannelSource::Analog {
        hw_init::init_peripherals(&config.select_gpios)?;
    }

    // ── 4. Network ────────────────────────────────────────────
    // Dropping the adapter stops the station; it lives as long as main.
    let mut wifi = new_wifi()?;
    wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)?;
    wifi.connect()?;

    let listener = TcpLineListener::bind(config.port, config.backlog)?;

    // ── 5. Serve forever ──────────────────────────────────────
    let server = spawn_pinned(SERVER_TASK, move || match config.source {
        ChannelSource::Analog => run_bridge(listener, analog_reader(&config), &config),
        ChannelSource::Synthetic => {
            run_bridge(listener, SyntheticReader::new(config.value_max), &config)
        }
    })?;

    server
        .join()
        .map_err(|_| anyhow!("bridge thread terminated"))?;
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()?;
    Ok(())
}

#[cfg(target_os = "espidf")]
fn new_wifi() -> Result<WifiAdapter> {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    Ok(WifiAdapter::new(peripherals.modem, sysloop, Some(nvs))?)
}

#[cfg(not(target_os = "espidf"))]
fn new_wifi() -> Result<WifiAdapter> {
    Ok(WifiAdapter::new())
}

fn analog_reader(config: &BridgeConfig) -> MuxAnalogReader<SelectLine, SliderAdc, StdDelay> {
    let selects = config
        .select_gpios
        .iter()
        .map(|&gpio| SelectLine::new(gpio))
        .collect();
    MuxAnalogReader::new(selects, SliderAdc, StdDelay, config.settle_us, config.value_max)
}

fn run_bridge<R: ChannelReader>(listener: TcpLineListener, reader: R, config: &BridgeConfig) -> ! {
    let sampler = Sampler::new(reader, config.channel_count());
    let mut server = BridgeServer::new(
        listener,
        sampler,
        MemoryGuardian::new(config.low_water_mark_bytes),
        HeapAdapter::new(),
        StdDelay,
        LogEventSink::new(),
        config.tick_interval_ms,
    );
    server.run()
}
