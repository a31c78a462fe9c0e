//! Display sink trait
//!
//! Defines the interface to the physical panel chain.

use marquee_protocol::Color16;

/// Display sink trait
///
/// Receives complete frames from the compositor. Presentation is
/// synchronous and infallible from the core's point of view; electrical
/// faults are the driver's business.
pub trait DisplaySink {
    /// Push a full frame
    ///
    /// - `width`, `height`: canvas size in pixels
    /// - `pixels`: row-major, `width * height` entries
    fn present(&mut self, width: usize, height: usize, pixels: &[Color16]);

    /// Set the global brightness in device units (0-255)
    fn set_brightness(&mut self, level: u8);
}
