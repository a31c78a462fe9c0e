//! Frame compositor
//!
//! Builds a canvas-sized frame from the background (image or solid color)
//! and zero or more copies of the active bitmap. All functions here are
//! pure with respect to everything but the output buffer.

use marquee_protocol::{Bitmap, Color16};

use crate::config::RenderConfig;
use crate::pixel::PixelBuffer;

/// X that horizontally centers `bitmap_width` on the canvas
pub fn centered_x(canvas_width: usize, bitmap_width: u16) -> i32 {
    (canvas_width as i32 - bitmap_width as i32) / 2
}

/// Y that vertically centers `bitmap_height` on the canvas
pub fn centered_y(canvas_height: usize, bitmap_height: u16) -> i32 {
    (canvas_height as i32 - bitmap_height as i32) / 2
}

/// Draw `bitmap` with its top-left corner at (x, y)
///
/// Pixels outside the frame are dropped. Without an alpha channel every
/// source pixel overwrites the destination, black included; with one, each
/// pixel is blended by its coverage.
pub fn blit(frame: &mut PixelBuffer, bitmap: &Bitmap, x: i32, y: i32) {
    let frame_width = frame.width();
    let bw = bitmap.width() as i32;
    let bh = bitmap.height() as i32;

    let x0 = x.max(0);
    let x1 = (x + bw).min(frame_width as i32);
    let y0 = y.max(0);
    let y1 = (y + bh).min(frame.height() as i32);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let span = (x1 - x0) as usize;
    let src_pixels = bitmap.pixels();
    let dst_pixels = frame.as_mut_slice();

    for dy in y0..y1 {
        let src_start = (dy - y) as usize * bw as usize + (x0 - x) as usize;
        let dst_start = dy as usize * frame_width + x0 as usize;
        let src = &src_pixels[src_start..src_start + span];
        let dst = &mut dst_pixels[dst_start..dst_start + span];

        match bitmap.alpha() {
            None => dst.copy_from_slice(src),
            Some(alpha) => {
                let coverage = &alpha[src_start..src_start + span];
                for ((d, s), a) in dst.iter_mut().zip(src).zip(coverage) {
                    *d = s.blend(*d, *a);
                }
            }
        }
    }
}

/// Compose a full frame
///
/// 1. Seed with `background` if it matches the frame size, else the solid
///    background color.
/// 2. Draw one copy of `bitmap` per head at
///    `(head + offset_x, centered_y + offset_y)`; no heads means a single
///    horizontally centered copy.
pub fn compose(
    frame: &mut PixelBuffer,
    config: &RenderConfig,
    background: Option<&PixelBuffer>,
    bitmap: Option<&Bitmap>,
    heads: &[i32],
) {
    let seeded = background.is_some_and(|bg| frame.copy_from(bg));
    if !seeded {
        frame.fill(config.background);
    }

    let Some(bitmap) = bitmap else {
        return;
    };
    if bitmap.is_empty() {
        return;
    }

    let y = centered_y(frame.height(), bitmap.height()) + config.offset_y as i32;
    let offset_x = config.offset_x as i32;
    if heads.is_empty() {
        let x = centered_x(frame.width(), bitmap.width()) + offset_x;
        blit(frame, bitmap, x, y);
    } else {
        for &head in heads {
            blit(frame, bitmap, head + offset_x, y);
        }
    }
}

/// Place an uploaded background image on a canvas-sized buffer
///
/// The image is centered and clipped; uncovered (or partly transparent)
/// pixels show `fill`.
pub fn render_background(width: usize, height: usize, image: &Bitmap, fill: Color16) -> PixelBuffer {
    let mut canvas = PixelBuffer::filled(width, height, fill);
    let x = centered_x(width, image.width());
    let y = centered_y(height, image.height());
    blit(&mut canvas, image, x, y);
    canvas
}
