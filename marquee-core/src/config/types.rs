//! Render configuration
//!
//! Everything an upload can change about how the bitmap is shown.

use serde::{Deserialize, Serialize};

use marquee_protocol::options::{brightness_to_device, GAP_RANGE};
use marquee_protocol::{BackgroundMode, Color16, Direction, UploadOptions};

use super::hardware::HardwareConfig;
use super::speed::SpeedPercent;

/// Render configuration
///
/// Created from hardware defaults at boot, edited by each upload and
/// persisted field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderConfig {
    /// Solid background color
    pub background: Color16,
    /// Whether the background image (if any) replaces the solid color
    pub background_mode: BackgroundMode,
    /// Text color; carried and persisted but never blended into pixels
    pub text_color: Color16,
    /// User horizontal offset in pixels
    pub offset_x: i16,
    /// User vertical offset in pixels
    pub offset_y: i16,
    /// Scroll the bitmap
    pub animate: bool,
    /// Scroll direction
    pub direction: Direction,
    /// Scroll speed
    pub speed: SpeedPercent,
    /// Pixels between successive marquee copies
    pub gap: u16,
    /// Brightness in percent (0-100)
    pub brightness: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_hardware(&HardwareConfig::default())
    }
}

impl RenderConfig {
    /// Boot-time configuration from hardware defaults
    pub fn from_hardware(hw: &HardwareConfig) -> Self {
        Self {
            background: hw.default_background(),
            background_mode: BackgroundMode::Color,
            text_color: hw.default_text_color(),
            offset_x: 0,
            offset_y: 0,
            animate: false,
            direction: Direction::Left,
            speed: SpeedPercent::new(hw.defaults.speed),
            gap: hw.defaults.gap.clamp(GAP_RANGE.0, GAP_RANGE.1),
            brightness: hw.defaults.brightness.min(100),
        }
    }

    /// Apply the options of a bitmap upload
    ///
    /// Every option present in an upload replaces the current value; the
    /// text color and brightness are kept when the upload omits them.
    pub fn apply_upload(&mut self, options: &UploadOptions) {
        self.background = options.background;
        if let Some(color) = options.text_color {
            self.text_color = color;
        }
        self.offset_x = options.offset_x;
        self.offset_y = options.offset_y;
        self.animate = options.animate;
        self.direction = options.direction;
        self.speed = SpeedPercent::new(options.speed);
        self.gap = options.gap;
        if let Some(brightness) = options.brightness {
            self.brightness = brightness;
        }
        if let Some(mode) = options.background_mode {
            self.background_mode = mode;
        }
    }

    /// Brightness in device units (0-255)
    pub fn device_brightness(&self) -> u8 {
        brightness_to_device(self.brightness)
    }
}
