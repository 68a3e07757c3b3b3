//! Synthetic channel source.
//!
//! Implements [`ChannelReader`] with uniform random draws over
//! `0..=value_max`.  Used for bench testing the client side without pots
//! attached; every channel is independent and stateless.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::ChannelReader;

pub struct SyntheticReader {
    rng: StdRng,
    value_max: u16,
}

impl SyntheticReader {
    /// Seeded from OS entropy (`esp_fill_random` on the device).
    pub fn new(value_max: u16) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            value_max,
        }
    }

    /// Deterministic sequence, for tests.
    pub fn with_seed(value_max: u16, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            value_max,
        }
    }
}

impl ChannelReader for SyntheticReader {
    fn read_channel(&mut self, _index: usize) -> u16 {
        self.rng.gen_range(0..=self.value_max)
    }
}
