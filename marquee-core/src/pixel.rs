//! Row-major RGB565 pixel buffer
//!
//! Used for the canvas (the frame pushed to the display) and for the
//! canvas-sized background image.

use alloc::vec;
use alloc::vec::Vec;

use marquee_protocol::Color16;

/// Row-major pixel buffer with fixed dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color16>,
}

impl PixelBuffer {
    /// Create a buffer filled with one color
    pub fn filled(width: usize, height: usize, color: Color16) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// True if this buffer has the given dimensions
    pub fn has_size(&self, width: usize, height: usize) -> bool {
        self.width == width && self.height == height
    }

    /// Overwrite every pixel
    pub fn fill(&mut self, color: Color16) {
        self.pixels.fill(color);
    }

    /// Pixel at (x, y)
    pub fn get(&self, x: usize, y: usize) -> Option<Color16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Set the pixel at (x, y); out-of-bounds writes are dropped
    pub fn set(&mut self, x: usize, y: usize, color: Color16) {
        if x >= self.width || y >= self.height {
            return;
        }
        if let Some(px) = self.pixels.get_mut(y * self.width + x) {
            *px = color;
        }
    }

    /// Fill a rectangle, clipped to the buffer
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, color: Color16) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        if x >= x_end {
            return;
        }
        for row in y..y_end {
            let start = row * self.width;
            self.pixels[start + x..start + x_end].fill(color);
        }
    }

    /// Copy all pixels from a buffer of the same size
    ///
    /// Returns false and leaves `self` untouched if the sizes differ.
    pub fn copy_from(&mut self, other: &PixelBuffer) -> bool {
        if !other.has_size(self.width, self.height) {
            return false;
        }
        self.pixels.copy_from_slice(&other.pixels);
        true
    }

    pub fn as_slice(&self) -> &[Color16] {
        &self.pixels
    }

    pub fn as_mut_slice(&mut self) -> &mut [Color16] {
        &mut self.pixels
    }

    /// One row of pixels
    pub fn row(&self, y: usize) -> Option<&[Color16]> {
        if y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width..(y + 1) * self.width)
    }

    /// Pixels as little-endian bytes
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_le_bytes()).collect()
    }

    /// Rebuild from little-endian bytes; `None` unless the length is exact
    pub fn from_le_bytes(width: usize, height: usize, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width.checked_mul(height)?.checked_mul(2)? {
            return None;
        }
        let pixels = bytes
            .chunks_exact(2)
            .map(|c| Color16::from_le_bytes([c[0], c[1]]))
            .collect();
        Some(Self {
            width,
            height,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled() {
        let buf = PixelBuffer::filled(4, 2, Color16::RED);
        assert_eq!(buf.len(), 8);
        assert!(buf.as_slice().iter().all(|&c| c == Color16::RED));
    }

    #[test]
    fn test_get_set_bounds() {
        let mut buf = PixelBuffer::filled(3, 3, Color16::BLACK);
        buf.set(2, 1, Color16::WHITE);
        buf.set(3, 0, Color16::WHITE);
        buf.set(0, 3, Color16::WHITE);

        assert_eq!(buf.get(2, 1), Some(Color16::WHITE));
        assert_eq!(buf.get(3, 0), None);
        assert_eq!(buf.as_slice().iter().filter(|&&c| c == Color16::WHITE).count(), 1);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut buf = PixelBuffer::filled(4, 4, Color16::BLACK);
        buf.fill_rect(2, 2, 10, 10, Color16::BLUE);

        assert_eq!(buf.get(1, 1), Some(Color16::BLACK));
        assert_eq!(buf.get(2, 2), Some(Color16::BLUE));
        assert_eq!(buf.get(3, 3), Some(Color16::BLUE));
        assert_eq!(buf.as_slice().iter().filter(|&&c| c == Color16::BLUE).count(), 4);
    }

    #[test]
    fn test_fill_rect_outside_is_noop() {
        let mut buf = PixelBuffer::filled(4, 4, Color16::BLACK);
        buf.fill_rect(8, 0, 2, 2, Color16::BLUE);
        buf.fill_rect(0, 8, 2, 2, Color16::BLUE);
        assert!(buf.as_slice().iter().all(|&c| c == Color16::BLACK));
    }

    #[test]
    fn test_copy_from_size_check() {
        let mut a = PixelBuffer::filled(2, 2, Color16::BLACK);
        let b = PixelBuffer::filled(2, 2, Color16::GREEN);
        let c = PixelBuffer::filled(3, 2, Color16::RED);

        assert!(a.copy_from(&b));
        assert_eq!(a.get(1, 1), Some(Color16::GREEN));
        assert!(!a.copy_from(&c));
        assert_eq!(a.get(1, 1), Some(Color16::GREEN));
    }

    #[test]
    fn test_le_bytes() {
        let mut buf = PixelBuffer::filled(2, 1, Color16::BLACK);
        buf.set(1, 0, Color16(0x1234));
        let bytes = buf.to_le_bytes();
        assert_eq!(bytes, [0x00, 0x00, 0x34, 0x12]);

        assert_eq!(PixelBuffer::from_le_bytes(2, 1, &bytes), Some(buf));
        assert_eq!(PixelBuffer::from_le_bytes(2, 2, &bytes), None);
    }

    #[test]
    fn test_row() {
        let mut buf = PixelBuffer::filled(2, 2, Color16::BLACK);
        buf.set(0, 1, Color16::WHITE);
        assert_eq!(buf.row(1), Some(&[Color16::WHITE, Color16::BLACK][..]));
        assert_eq!(buf.row(2), None);
    }
}
