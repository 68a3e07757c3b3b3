//! Pipe-delimited line codec.
//!
//! Wire format, one line per changed snapshot:
//! ```text
//! v0|v1|...|v{n-1}\r\n
//! ```
//!
//! Values are unsigned decimal in channel order.  There is no length
//! prefix; readers split on the line terminator.  [`encode`] is what the
//! bridge pushes; [`decode_line`] is the consumer-side parser, used by the
//! loopback tests and the fuzz target.

use core::fmt;
use core::fmt::Write as _;

use crate::app::sampler::Snapshot;
use crate::config::MAX_CHANNELS;

/// Largest encoded frame: `MAX_CHANNELS` five-digit values, separators, CRLF.
pub const MAX_FRAME_LEN: usize = MAX_CHANNELS * 6 + 2;

/// Highest value a well-formed first field may carry.
pub const VALUE_MAX: u16 = 1023;

/// Line terminator.
pub const TERMINATOR: &str = "\r\n";

/// An encoded frame, stack-allocated.
pub type Frame = heapless::Vec<u8, MAX_FRAME_LEN>;

/// Render `values` as one wire line.
pub fn encode_values(values: &[u16]) -> Frame {
    let mut line: heapless::String<MAX_FRAME_LEN> = heapless::String::new();
    for (i, v) in values.iter().take(MAX_CHANNELS).enumerate() {
        if i > 0 {
            let _ = line.push('|');
        }
        // Capacity covers MAX_CHANNELS five-digit values; cannot overflow.
        let _ = write!(line, "{}", v);
    }
    let _ = line.push_str(TERMINATOR);
    line.into_bytes()
}

/// Render a snapshot as one wire line.
pub fn encode(snapshot: &Snapshot) -> Frame {
    encode_values(&snapshot.values)
}

// ───────────────────────────────────────────────────────────────
// Consumer side
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Nothing between the start of the line and the terminator.
    Empty,
    /// A field was not an unsigned decimal integer.
    NotANumber { field: usize },
    /// The first field exceeded [`VALUE_MAX`], typical of a line whose
    /// start was glued to the tail of a previous one.
    Malformed,
    /// More fields than [`MAX_CHANNELS`].
    TooManyFields,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::NotANumber { field } => write!(f, "field {} is not a number", field),
            Self::Malformed => write!(f, "malformed line (first value out of range)"),
            Self::TooManyFields => write!(f, "more than {} fields", MAX_CHANNELS),
        }
    }
}

/// Parse one received line back into channel values.
///
/// Accepts the line with or without its `\r\n` (or bare `\n`) terminator.
pub fn decode_line(line: &str) -> Result<heapless::Vec<u16, MAX_CHANNELS>, LineError> {
    let body = line
        .strip_suffix('\n')
        .map_or(line, |l| l.strip_suffix('\r').unwrap_or(l));
    if body.is_empty() {
        return Err(LineError::Empty);
    }

    let mut values = heapless::Vec::new();
    for (field, text) in body.split('|').enumerate() {
        let v: u16 = text
            .parse()
            .map_err(|_| LineError::NotANumber { field })?;
        if field == 0 && v > VALUE_MAX {
            return Err(LineError::Malformed);
        }
        values.push(v).map_err(|_| LineError::TooManyFields)?;
    }
    Ok(values)
}
