//! Fuzz target: `wire::decode_line`
//!
//! Feeds arbitrary text to the consumer-side line parser and checks that
//! it never panics, that accepted lines respect the field limits, and
//! that re-encoding an accepted line decodes to the same values.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use sliderbridge::config::MAX_CHANNELS;
use sliderbridge::wire::{VALUE_MAX, decode_line, encode_values};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(values) = decode_line(line) {
        assert!(!values.is_empty() && values.len() <= MAX_CHANNELS);
        assert!(values[0] <= VALUE_MAX, "first field out of range");

        let frame = encode_values(&values);
        let text = core::str::from_utf8(&frame).expect("encoder emits ASCII");
        assert_eq!(decode_line(text).as_deref(), Ok(values.as_slice()));
    }
});
