//! RGB565 color values and alpha blending

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Packed 5-6-5 RGB color
///
/// Bits 15..11 are red, 10..5 green, 4..0 blue. There is no alpha channel;
/// coverage travels as a separate byte per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color16(pub u16);

impl Color16 {
    pub const BLACK: Color16 = Color16(0x0000);
    pub const WHITE: Color16 = Color16(0xFFFF);
    pub const RED: Color16 = Color16(0xF800);
    pub const GREEN: Color16 = Color16(0x07E0);
    pub const BLUE: Color16 = Color16(0x001F);

    /// Pack 8-bit channels, dropping the low bits
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    /// Expand to 8-bit channels
    ///
    /// High bits are replicated into the low bits so full-scale 565 maps to
    /// full-scale 888 (0x1F -> 0xFF, not 0xF8).
    pub const fn to_rgb888(self) -> (u8, u8, u8) {
        let r5 = ((self.0 >> 11) & 0x1F) as u8;
        let g6 = ((self.0 >> 5) & 0x3F) as u8;
        let b5 = (self.0 & 0x1F) as u8;
        (
            (r5 << 3) | (r5 >> 2),
            (g6 << 2) | (g6 >> 4),
            (b5 << 3) | (b5 >> 2),
        )
    }

    /// Raw 16-bit value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Little-endian wire bytes
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    /// Decode from little-endian wire bytes
    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    /// Parse `#RRGGBB` or `RRGGBB`
    ///
    /// Returns `None` for anything else, including short or non-hex input.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: core::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        };
        Some(Self::from_rgb888(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Composite `self` over `dst` with 8-bit coverage
    ///
    /// Each channel is expanded to 8 bits and mixed as
    /// `(src*a + dst*(255-a) + 127) / 255`, then re-packed. Coverage 0
    /// returns `dst` and 255 returns `self` unchanged.
    pub fn blend(self, dst: Color16, alpha: u8) -> Color16 {
        match alpha {
            0 => dst,
            255 => self,
            a => {
                let (sr, sg, sb) = self.to_rgb888();
                let (dr, dg, db) = dst.to_rgb888();
                let a = a as u32;
                let mix = |s: u8, d: u8| -> u8 {
                    ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8
                };
                Color16::from_rgb888(mix(sr, dr), mix(sg, dg), mix(sb, db))
            }
        }
    }
}

impl From<u16> for Color16 {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Color16> for u16 {
    fn from(color: Color16) -> Self {
        color.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb888_primaries() {
        assert_eq!(Color16::from_rgb888(255, 0, 0), Color16::RED);
        assert_eq!(Color16::from_rgb888(0, 255, 0), Color16::GREEN);
        assert_eq!(Color16::from_rgb888(0, 0, 255), Color16::BLUE);
        assert_eq!(Color16::from_rgb888(255, 255, 255), Color16::WHITE);
    }

    #[test]
    fn test_to_rgb888_full_scale() {
        assert_eq!(Color16::WHITE.to_rgb888(), (255, 255, 255));
        assert_eq!(Color16::BLACK.to_rgb888(), (0, 0, 0));
        assert_eq!(Color16::GREEN.to_rgb888(), (0, 255, 0));
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Color16::from_hex("#FFFFFF"), Some(Color16::WHITE));
        assert_eq!(Color16::from_hex("00ff00"), Some(Color16::GREEN));
        assert_eq!(Color16::from_hex("#0040ff"), Some(Color16::from_rgb888(0, 64, 255)));
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert_eq!(Color16::from_hex(""), None);
        assert_eq!(Color16::from_hex("#FFF"), None);
        assert_eq!(Color16::from_hex("#GG0000"), None);
        assert_eq!(Color16::from_hex("#ffffff00"), None);
        assert_eq!(Color16::from_hex("ééé"), None);
    }

    #[test]
    fn test_blend_extremes() {
        let src = Color16(0x1234);
        let dst = Color16(0xABCD);
        assert_eq!(src.blend(dst, 0), dst);
        assert_eq!(src.blend(dst, 255), src);
    }

    #[test]
    fn test_blend_half_white_over_green() {
        // r: (255*128 + 127)/255 = 128, g: 255, b: 128
        let out = Color16::WHITE.blend(Color16::GREEN, 128);
        assert_eq!(out, Color16::from_rgb888(128, 255, 128));
        assert_eq!(out, Color16(0x87F0));
    }

    #[test]
    fn test_le_bytes() {
        assert_eq!(Color16(0x07E0).to_le_bytes(), [0xE0, 0x07]);
        assert_eq!(Color16::from_le_bytes([0xE0, 0x07]), Color16::GREEN);
    }
}
