//! Channel sampler: change detection over a fixed channel set.
//!
//! The sampler owns the ordered channel list and the read port.  Each
//! [`Sampler::sample_all`] reads every channel once, compares the whole
//! new vector against the stored one, and bulk-replaces the stored values
//! only when at least one element differs.
//!
//! A dirty step overwrites every channel, including the ones that did not
//! move on their own.

use heapless::Vec;

use crate::config::MAX_CHANNELS;

use super::ports::ChannelReader;

/// One tracked input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    pub index: usize,
    pub last_value: u16,
}

/// Ordered channel values after one sampling step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub values: Vec<u16, MAX_CHANNELS>,
    pub dirty: bool,
}

pub struct Sampler<R: ChannelReader> {
    reader: R,
    channels: Vec<Channel, MAX_CHANNELS>,
}

impl<R: ChannelReader> Sampler<R> {
    /// Create `count` channels with a zero baseline.
    ///
    /// Counts above [`MAX_CHANNELS`] are truncated.
    pub fn new(reader: R, count: usize) -> Self {
        if count > MAX_CHANNELS {
            log::warn!(
                "Sampler: {} channels requested, capped at {}",
                count,
                MAX_CHANNELS
            );
        }
        let channels = (0..count.min(MAX_CHANNELS))
            .map(|index| Channel {
                index,
                last_value: 0,
            })
            .collect();
        Self { reader, channels }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Read every channel in order and report whether anything changed.
    pub fn sample_all(&mut self) -> Snapshot {
        let fresh: Vec<u16, MAX_CHANNELS> = self
            .channels
            .iter()
            .map(|ch| self.reader.read_channel(ch.index))
            .collect();

        let dirty = self
            .channels
            .iter()
            .zip(fresh.iter())
            .any(|(ch, &v)| ch.last_value != v);

        if dirty {
            for (ch, &v) in self.channels.iter_mut().zip(fresh.iter()) {
                ch.last_value = v;
            }
        }

        Snapshot {
            values: self.channels.iter().map(|ch| ch.last_value).collect(),
            dirty,
        }
    }
}
