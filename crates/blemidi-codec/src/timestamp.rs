//! 13-bit BLE-MIDI timestamps.
//!
//! The packet header carries the high 6 bits, each timestamp byte the low 7.
//! The counter wraps at 8192 ms and has no absolute reference.

use serde::{Deserialize, Serialize};

/// Device-local rolling millisecond counter in `0..=8191`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u16);

impl Timestamp {
    pub const MAX: u16 = 0x1FFF;

    const LOW_MASK: u16 = 0x7F;

    #[inline]
    pub fn new(value: u16) -> Self {
        Self(value & Self::MAX)
    }

    /// Combine a header's high bits with a timestamp byte's low bits.
    #[inline]
    pub fn from_parts(high: u8, low: u8) -> Self {
        Self::new(((high as u16 & 0x3F) << 7) | (low as u16 & 0x7F))
    }

    /// Timestamp for a new low field that follows `self` in the same stream.
    ///
    /// A low field smaller than the previous one means the low counter
    /// wrapped, so the high bits advance by one.
    #[inline]
    pub fn advance(self, low: u8) -> Self {
        let low = low as u16 & Self::LOW_MASK;
        let mut high = self.0 >> 7;
        if low < (self.0 & Self::LOW_MASK) {
            high += 1;
        }
        Self::new((high << 7) | low)
    }

    #[inline]
    pub fn high(self) -> u8 {
        (self.0 >> 7) as u8
    }

    #[inline]
    pub fn low(self) -> u8 {
        (self.0 & Self::LOW_MASK) as u8
    }

    #[inline]
    pub fn as_millis(self) -> u16 {
        self.0
    }
}

impl From<Timestamp> for u16 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}
