//! Multiplexed analog reader.
//!
//! Implements [`ChannelReader`] for pots that share one ADC input: each
//! channel has its own select line, and reading channel `i` means
//!
//! 1. drive select line `i` high,
//! 2. wait the settle time (10 µs by default),
//! 3. sample the shared converter,
//! 4. drive select line `i` low.
//!
//! Generic over embedded-hal [`OutputPin`] and [`DelayNs`], so the same
//! code drives raw ESP-IDF GPIOs on the device and recording mocks in
//! tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;
use log::warn;

use crate::app::ports::ChannelReader;
use crate::config::MAX_CHANNELS;

/// A shared analog converter.  Returns the raw reading on the bridge's
/// 10-bit scale.
pub trait AdcSample {
    fn sample(&mut self) -> u16;
}

pub struct MuxAnalogReader<P, A, D>
where
    P: OutputPin,
    A: AdcSample,
    D: DelayNs,
{
    selects: Vec<P, MAX_CHANNELS>,
    adc: A,
    delay: D,
    settle_us: u32,
    value_max: u16,
}

impl<P, A, D> MuxAnalogReader<P, A, D>
where
    P: OutputPin,
    A: AdcSample,
    D: DelayNs,
{
    pub fn new(selects: Vec<P, MAX_CHANNELS>, adc: A, delay: D, settle_us: u32, value_max: u16) -> Self {
        Self {
            selects,
            adc,
            delay,
            settle_us,
            value_max,
        }
    }

    pub fn selects(&self) -> &[P] {
        &self.selects
    }
}

impl<P, A, D> ChannelReader for MuxAnalogReader<P, A, D>
where
    P: OutputPin,
    A: AdcSample,
    D: DelayNs,
{
    fn read_channel(&mut self, index: usize) -> u16 {
        let Some(pin) = self.selects.get_mut(index) else {
            warn!("Analog: no select line for channel {}", index);
            return 0;
        };

        if pin.set_high().is_err() {
            warn!("Analog: select line {} failed to go high", index);
        }
        self.delay.delay_us(self.settle_us);
        let value = self.adc.sample().min(self.value_max);
        if pin.set_low().is_err() {
            warn!("Analog: select line {} failed to go low", index);
        }
        value
    }
}
