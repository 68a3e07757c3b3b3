//! One-shot peripheral initialization and raw pin/ADC access.
//!
//! Configures the shared ADC1 channel and the per-channel select lines
//! using raw ESP-IDF sys calls.  Called once from `main()` before the
//! server thread starts.  [`SelectLine`] and [`SliderAdc`] are the
//! handles the analog reader drives afterwards.
//!
//! On host targets every call is a simulation stub; the ADC returns the
//! value last stored with [`sim_set_adc`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::adapters::analog::AdcSample;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
pub fn init_peripherals(select_gpios: &[i32]) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the server thread starts.
    unsafe {
        init_adc()?;
        init_select_lines(select_gpios)?;
    }
    info!("hw_init: ADC + {} select lines configured", select_gpios.len());
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(select_gpios: &[i32]) -> Result<(), HwInitError> {
    log::info!(
        "hw_init(sim): peripheral init skipped ({} select lines)",
        select_gpios.len()
    );
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only after `init_adc()`; the handle is written
/// once at boot and only read afterwards, from the server thread.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe {
        adc_oneshot_config_channel(adc1_handle(), crate::pins::SLIDER_ADC_CHANNEL, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!(
        "hw_init: ADC1 CH{} (GPIO{}) configured (sliders)",
        crate::pins::SLIDER_ADC_CHANNEL,
        crate::pins::SLIDER_ADC_GPIO
    );
    Ok(())
}

/// Raw 12-bit read of the shared slider channel.  Returns 0 on error.
#[cfg(target_os = "espidf")]
fn adc1_read_raw() -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, written once at boot.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), crate::pins::SLIDER_ADC_CHANNEL, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.clamp(0, 4095) as u16
}

#[cfg(not(target_os = "espidf"))]
static SIM_ADC: AtomicU16 = AtomicU16::new(0);

/// Store the value the simulated ADC returns (10-bit scale).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(value: u16) {
    SIM_ADC.store(value, Ordering::Relaxed);
}

/// Shared slider ADC, scaled to a 10-bit range (0–1023).
#[derive(Debug, Default)]
pub struct SliderAdc;

impl AdcSample for SliderAdc {
    #[cfg(target_os = "espidf")]
    fn sample(&mut self) -> u16 {
        adc1_read_raw() >> 2
    }

    #[cfg(not(target_os = "espidf"))]
    fn sample(&mut self) -> u16 {
        SIM_ADC.load(Ordering::Relaxed)
    }
}

// ── Select lines ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_select_lines(select_gpios: &[i32]) -> Result<(), HwInitError> {
    for &pin in select_gpios {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }
    Ok(())
}

/// `gpio_set_level` returned an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioWriteError(pub i32);

impl embedded_hal::digital::Error for GpioWriteError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// One channel-select output, configured by [`init_peripherals`].
#[derive(Debug)]
pub struct SelectLine {
    gpio: i32,
    #[cfg(not(target_os = "espidf"))]
    high: bool,
}

impl SelectLine {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            #[cfg(not(target_os = "espidf"))]
            high: false,
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    #[cfg(target_os = "espidf")]
    fn write(&mut self, high: bool) -> Result<(), GpioWriteError> {
        // SAFETY: gpio_set_level writes an already-configured output pin.
        let ret = unsafe { gpio_set_level(self.gpio, u32::from(high)) };
        if ret == ESP_OK as i32 {
            Ok(())
        } else {
            Err(GpioWriteError(ret))
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write(&mut self, high: bool) -> Result<(), GpioWriteError> {
        self.high = high;
        Ok(())
    }

    /// Simulated level (host only).
    #[cfg(not(target_os = "espidf"))]
    pub fn is_high(&self) -> bool {
        self.high
    }
}

impl embedded_hal::digital::ErrorType for SelectLine {
    type Error = GpioWriteError;
}

impl embedded_hal::digital::OutputPin for SelectLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}
