//! Canvas-sized file payloads
//!
//! File format:
//! - WIDTH (2 bytes): little-endian u16
//! - HEIGHT (2 bytes): little-endian u16
//! - PIXELS: `w*h` little-endian RGB565 words
//! - CRC (4 bytes): little-endian CRC-32 of everything before it

use alloc::vec::Vec;

use crate::pixel::PixelBuffer;

use super::SnapshotError;

/// Header plus trailer size
const OVERHEAD: usize = 2 + 2 + 4;

/// Serialize a canvas-sized buffer
pub fn encode_canvas(buffer: &PixelBuffer) -> Result<Vec<u8>, SnapshotError> {
    let width = u16::try_from(buffer.width()).map_err(|_| SnapshotError::Serialize)?;
    let height = u16::try_from(buffer.height()).map_err(|_| SnapshotError::Serialize)?;

    let mut out = Vec::with_capacity(OVERHEAD + buffer.len() * 2);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&buffer.to_le_bytes());
    let crc = crc32fast::hash(&out);
    out.extend_from_slice(&crc.to_le_bytes());
    Ok(out)
}

/// Parse a canvas payload, requiring the given dimensions
pub fn decode_canvas(bytes: &[u8], width: usize, height: usize) -> Result<PixelBuffer, SnapshotError> {
    if bytes.len() < OVERHEAD {
        return Err(SnapshotError::Deserialize);
    }
    let (body, trailer) = bytes.split_at(bytes.len() - 4);
    let stored_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    if crc32fast::hash(body) != stored_crc {
        return Err(SnapshotError::CrcMismatch);
    }

    let stored_width = u16::from_le_bytes([body[0], body[1]]) as usize;
    let stored_height = u16::from_le_bytes([body[2], body[3]]) as usize;
    if stored_width != width || stored_height != height {
        return Err(SnapshotError::LayoutMismatch);
    }

    PixelBuffer::from_le_bytes(width, height, &body[4..]).ok_or(SnapshotError::LayoutMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_protocol::Color16;

    fn sample() -> PixelBuffer {
        let mut buf = PixelBuffer::filled(3, 2, Color16::BLUE);
        buf.set(2, 1, Color16::RED);
        buf
    }

    #[test]
    fn test_encode_layout() {
        let bytes = encode_canvas(&sample()).unwrap();
        assert_eq!(bytes.len(), 4 + 3 * 2 * 2 + 4);
        assert_eq!(&bytes[..4], &[3, 0, 2, 0]);
    }

    #[test]
    fn test_decode_matches() {
        let bytes = encode_canvas(&sample()).unwrap();
        assert_eq!(decode_canvas(&bytes, 3, 2), Ok(sample()));
    }

    #[test]
    fn test_decode_wrong_canvas() {
        let bytes = encode_canvas(&sample()).unwrap();
        assert_eq!(decode_canvas(&bytes, 2, 3), Err(SnapshotError::LayoutMismatch));
    }

    #[test]
    fn test_decode_corrupt() {
        let mut bytes = encode_canvas(&sample()).unwrap();
        bytes[6] ^= 0xFF;
        assert_eq!(decode_canvas(&bytes, 3, 2), Err(SnapshotError::CrcMismatch));
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(decode_canvas(&[1, 0, 1, 0], 1, 1), Err(SnapshotError::Deserialize));
    }
}
