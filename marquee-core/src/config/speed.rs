//! Scroll speed units
//!
//! Speed is stored as a percentage (1 = slowest, 100 = fastest). Older
//! snapshots stored a per-frame delay in milliseconds instead; the two are
//! related by a fixed piecewise-linear table.

use serde::{Deserialize, Serialize};

/// Delay (ms) to percent anchor points, delay descending
pub const SPEED_TABLE: [(u8, u8); 7] = [
    (50, 1),
    (40, 15),
    (30, 30),
    (20, 50),
    (10, 75),
    (5, 90),
    (2, 100),
];

/// Legacy delay range in milliseconds
pub const LEGACY_DELAY_RANGE: (u8, u8) = (2, 50);

/// Scroll speed in percent, always within 1..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedPercent(u8);

impl Default for SpeedPercent {
    fn default() -> Self {
        Self(marquee_protocol::options::DEFAULT_SPEED)
    }
}

impl SpeedPercent {
    pub const MIN: SpeedPercent = SpeedPercent(1);
    pub const MAX: SpeedPercent = SpeedPercent(100);

    /// Create a speed, clamping into range
    pub const fn new(percent: u8) -> Self {
        if percent < 1 {
            Self::MIN
        } else if percent > 100 {
            Self::MAX
        } else {
            Self(percent)
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Convert a legacy frame delay
    pub fn from_legacy_delay_ms(delay_ms: u8) -> Self {
        let (min, max) = LEGACY_DELAY_RANGE;
        let d = delay_ms.clamp(min, max) as u32;
        for pair in SPEED_TABLE.windows(2) {
            let [(d0, p0), (d1, p1)] = pair else { continue };
            let (d0, p0, d1, p1) = (*d0 as u32, *p0 as u32, *d1 as u32, *p1 as u32);
            if d <= d0 && d >= d1 {
                let span = d0 - d1;
                let p = p0 + ((d0 - d) * (p1 - p0) + span / 2) / span;
                return Self::new(p as u8);
            }
        }
        Self::MAX
    }

    /// Convert to a frame delay in milliseconds
    pub fn to_legacy_delay_ms(self) -> u8 {
        let p = self.0 as u32;
        for pair in SPEED_TABLE.windows(2) {
            let [(d0, p0), (d1, p1)] = pair else { continue };
            let (d0, p0, d1, p1) = (*d0 as u32, *p0 as u32, *d1 as u32, *p1 as u32);
            if p >= p0 && p <= p1 {
                let span = p1 - p0;
                let d = d0 - ((p - p0) * (d0 - d1) + span / 2) / span;
                return d as u8;
            }
        }
        LEGACY_DELAY_RANGE.0
    }

    /// Animation tick interval
    pub fn frame_interval_ms(self) -> u32 {
        self.to_legacy_delay_ms() as u32
    }
}
