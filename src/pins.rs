//! GPIO / peripheral pin assignments for the slider board.
//!
//! Single source of truth: the config defaults and the ADC driver
//! reference this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Channel select lines (one per potentiometer)
// ---------------------------------------------------------------------------

/// Digital outputs: HIGH routes the matching pot onto the shared ADC input.
/// Array order is channel order, which is also wire order.
pub const SELECT_GPIOS: [i32; 3] = [21, 3, 2];

// ---------------------------------------------------------------------------
// Shared analog input
// ---------------------------------------------------------------------------

/// Common wiper net for all pots.  ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const SLIDER_ADC_GPIO: i32 = 1;
/// ADC1 channel feeding the shared wiper net.
pub const SLIDER_ADC_CHANNEL: u32 = 0;
