//! Bitmap upload decoding
//!
//! Upload format:
//! - WIDTH (2 bytes): little-endian u16, non-zero
//! - HEIGHT (2 bytes): little-endian u16, non-zero
//! - PIXELS: either `w*h` little-endian RGB565 words, or `w*h` triples of
//!   `[alpha, color_lo, color_hi]`
//!
//! The encoding is inferred from the total length. Anything that matches
//! neither size exactly is rejected; truncated uploads are never padded.

use alloc::vec::Vec;
use core::fmt;

use crate::color::Color16;

/// Header size (WIDTH + HEIGHT)
pub const HEADER_LEN: usize = 4;

/// Errors that can occur while decoding an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UploadError {
    /// Too short to contain a header
    MalformedInput,
    /// Zero or over-limit width/height
    InvalidDimensions { width: u16, height: u16 },
    /// Payload length matches neither encoding
    SizeMismatch {
        /// Bytes received
        actual: usize,
        /// Expected length for RGB565-only
        rgb565: usize,
        /// Expected length for A8+RGB565
        alpha_rgb565: usize,
    },
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput => write!(f, "upload too short for header"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions {}x{}", width, height)
            }
            Self::SizeMismatch {
                actual,
                rgb565,
                alpha_rgb565,
            } => write!(
                f,
                "size mismatch: got {} bytes, expected {} or {}",
                actual, rgb565, alpha_rgb565
            ),
        }
    }
}

/// Pixel encoding of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Encoding {
    /// Two bytes per pixel, fully opaque
    Rgb565,
    /// Three bytes per pixel, alpha first
    AlphaRgb565,
}

impl Encoding {
    /// Bytes per pixel on the wire
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Encoding::Rgb565 => 2,
            Encoding::AlphaRgb565 => 3,
        }
    }

    /// Total upload length for the given dimensions
    pub const fn upload_len(self, width: u16, height: u16) -> usize {
        HEADER_LEN + width as usize * height as usize * self.bytes_per_pixel()
    }
}

/// Dimension limits applied while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeLimits {
    /// Largest accepted width
    pub max_width: u16,
    /// Largest accepted height
    pub max_height: u16,
}

impl DecodeLimits {
    /// Limits for a canvas: text may be up to four canvases wide but no
    /// taller than one
    pub fn for_canvas(width: usize, height: usize) -> Self {
        let clamp = |v: usize| u16::try_from(v).unwrap_or(u16::MAX);
        Self {
            max_width: clamp(width.saturating_mul(4)),
            max_height: clamp(height),
        }
    }

    fn check(&self, width: u16, height: u16) -> Result<(), UploadError> {
        if width == 0 || height == 0 || width > self.max_width || height > self.max_height {
            return Err(UploadError::InvalidDimensions { width, height });
        }
        Ok(())
    }
}

/// A decoded, validated bitmap
///
/// `pixels.len() == width * height` always holds, and so does
/// `alpha.len() == pixels.len()` when alpha is present. The fields are
/// private so no caller can break that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u16,
    height: u16,
    pixels: Vec<Color16>,
    alpha: Option<Vec<u8>>,
}

impl Bitmap {
    /// Build a bitmap from parts, checking the length invariants
    pub fn new(
        width: u16,
        height: u16,
        pixels: Vec<Color16>,
        alpha: Option<Vec<u8>>,
    ) -> Result<Self, UploadError> {
        let count = width as usize * height as usize;
        let alpha_ok = alpha.as_ref().map_or(true, |a| a.len() == count);
        if pixels.len() != count || !alpha_ok {
            return Err(UploadError::SizeMismatch {
                actual: pixels.len(),
                rgb565: count,
                alpha_rgb565: count,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            alpha,
        })
    }

    /// Fully opaque bitmap filled with one color
    pub fn solid(width: u16, height: u16, color: Color16) -> Self {
        Self {
            width,
            height,
            pixels: alloc::vec![color; width as usize * height as usize],
            alpha: None,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Row-major colors
    pub fn pixels(&self) -> &[Color16] {
        &self.pixels
    }

    /// Per-pixel coverage, if the upload carried one
    pub fn alpha(&self) -> Option<&[u8]> {
        self.alpha.as_deref()
    }

    /// True if the bitmap has no pixels
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Encoding this bitmap would use on the wire
    pub fn encoding(&self) -> Encoding {
        if self.alpha.is_some() {
            Encoding::AlphaRgb565
        } else {
            Encoding::Rgb565
        }
    }

    /// Serialize back into upload wire format
    pub fn encode(&self) -> Vec<u8> {
        let encoding = self.encoding();
        let mut out = Vec::with_capacity(encoding.upload_len(self.width, self.height));
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        match &self.alpha {
            Some(alpha) => {
                for (color, a) in self.pixels.iter().zip(alpha) {
                    out.push(*a);
                    out.extend_from_slice(&color.to_le_bytes());
                }
            }
            None => {
                for color in &self.pixels {
                    out.extend_from_slice(&color.to_le_bytes());
                }
            }
        }
        out
    }
}

fn read_header(bytes: &[u8]) -> Result<(u16, u16), UploadError> {
    match bytes {
        [w0, w1, h0, h1, ..] => Ok((
            u16::from_le_bytes([*w0, *w1]),
            u16::from_le_bytes([*h0, *h1]),
        )),
        _ => Err(UploadError::MalformedInput),
    }
}

/// Decode a complete upload
///
/// Validation runs in a fixed order: header present, non-zero dimensions,
/// dimensions within `limits`, then exact length match.
pub fn decode_upload(bytes: &[u8], limits: &DecodeLimits) -> Result<Bitmap, UploadError> {
    let (width, height) = read_header(bytes)?;
    limits.check(width, height)?;

    let rgb565 = Encoding::Rgb565.upload_len(width, height);
    let alpha_rgb565 = Encoding::AlphaRgb565.upload_len(width, height);
    let body = &bytes[HEADER_LEN..];

    let (pixels, alpha) = if bytes.len() == rgb565 {
        let pixels = body
            .chunks_exact(2)
            .map(|c| Color16::from_le_bytes([c[0], c[1]]))
            .collect();
        (pixels, None)
    } else if bytes.len() == alpha_rgb565 {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count);
        let mut alpha = Vec::with_capacity(count);
        for c in body.chunks_exact(3) {
            alpha.push(c[0]);
            pixels.push(Color16::from_le_bytes([c[1], c[2]]));
        }
        (pixels, Some(alpha))
    } else {
        return Err(UploadError::SizeMismatch {
            actual: bytes.len(),
            rgb565,
            alpha_rgb565,
        });
    };

    Ok(Bitmap {
        width,
        height,
        pixels,
        alpha,
    })
}

/// Accumulates an upload delivered in chunks
///
/// The transport hands over the body piecewise. The receiver checks the
/// header as soon as it is complete and stops buffering once the stream is
/// longer than any valid encoding, so an oversized upload never grows the
/// buffer past the largest acceptable size.
#[derive(Debug, Clone)]
pub struct UploadReceiver {
    limits: DecodeLimits,
    buffer: Vec<u8>,
    state: ReceiveState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiveState {
    /// Fewer than HEADER_LEN bytes so far
    WaitingForHeader,
    /// Header accepted, reading pixels up to the given maximum length
    ReadingPixels { max_len: usize },
    /// A previous chunk failed validation
    Failed(UploadError),
}

impl UploadReceiver {
    /// Create a receiver bound to the given limits
    pub fn new(limits: DecodeLimits) -> Self {
        Self {
            limits,
            buffer: Vec::new(),
            state: ReceiveState::WaitingForHeader,
        }
    }

    /// Discard everything received so far
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = ReceiveState::WaitingForHeader;
    }

    /// Bytes buffered so far
    pub fn received(&self) -> usize {
        self.buffer.len()
    }

    /// Feed the next chunk of the stream
    ///
    /// Errors are sticky: once a chunk fails, later chunks are ignored and
    /// [`finish`](Self::finish) reports the same error.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        match self.state {
            ReceiveState::Failed(err) => Err(err),
            ReceiveState::WaitingForHeader => {
                let need = HEADER_LEN - self.buffer.len();
                if chunk.len() < need {
                    self.buffer.extend_from_slice(chunk);
                    return Ok(());
                }
                self.buffer.extend_from_slice(&chunk[..need]);
                let (width, height) = read_header(&self.buffer)?;
                if let Err(err) = self.limits.check(width, height) {
                    self.state = ReceiveState::Failed(err);
                    return Err(err);
                }
                let max_len = Encoding::AlphaRgb565.upload_len(width, height);
                self.buffer.reserve(max_len - HEADER_LEN);
                self.state = ReceiveState::ReadingPixels { max_len };
                self.feed_pixels(&chunk[need..], max_len)
            }
            ReceiveState::ReadingPixels { max_len } => self.feed_pixels(chunk, max_len),
        }
    }

    fn feed_pixels(&mut self, chunk: &[u8], max_len: usize) -> Result<(), UploadError> {
        let total = self.buffer.len() + chunk.len();
        if total > max_len {
            let (width, height) = read_header(&self.buffer)?;
            let err = UploadError::SizeMismatch {
                actual: total,
                rgb565: Encoding::Rgb565.upload_len(width, height),
                alpha_rgb565: max_len,
            };
            self.state = ReceiveState::Failed(err);
            return Err(err);
        }
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    /// End of stream: decode what was received
    ///
    /// The receiver is reset afterwards either way.
    pub fn finish(&mut self) -> Result<Bitmap, UploadError> {
        let result = match self.state {
            ReceiveState::Failed(err) => Err(err),
            _ => decode_upload(&self.buffer, &self.limits),
        };
        self.reset();
        result
    }
}
