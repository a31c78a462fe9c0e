//! Named upload options and layout tokens
//!
//! The transport hands every upload a bag of string key/value pairs. This
//! module turns them into typed, range-checked values. Nothing here ever
//! fails: out-of-range numbers are clamped, unparsable ones fall back to
//! their defaults, and unknown tokens are ignored.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Color16;

/// Largest accepted user offset magnitude in pixels
pub const MAX_USER_OFFSET: i16 = 1024;

/// Speed range in percent
pub const SPEED_RANGE: (u8, u8) = (1, 100);

/// Default speed in percent
pub const DEFAULT_SPEED: u8 = 50;

/// Gap range in pixels
pub const GAP_RANGE: (u16, u16) = (1, 300);

/// Default gap in pixels
pub const DEFAULT_GAP: u16 = 1;

/// Most tiles a layout may have
pub const MAX_TILES: usize = 8;

/// Human-facing tile names, by index
pub const TILE_LABELS: [&str; MAX_TILES] = [
    "main", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth",
];

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Content moves toward x = 0
    #[default]
    Left,
    /// Content moves toward x = width
    Right,
}

impl Direction {
    /// Parse a direction token; anything but `right` is `Left`
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("right") {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    /// Per-tick X step (-1 or +1)
    pub const fn step(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// Source of the canvas background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BackgroundMode {
    /// Solid background color
    #[default]
    Color,
    /// Uploaded background image
    Image,
}

impl BackgroundMode {
    /// Parse `color` or `image`
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("color") {
            Some(BackgroundMode::Color)
        } else if token.eq_ignore_ascii_case("image") {
            Some(BackgroundMode::Image)
        } else {
            None
        }
    }
}

/// Options that accompany a bitmap upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UploadOptions {
    /// Background fill (`bg`; missing or invalid is black)
    pub background: Color16,
    /// Text color (`color`), decorative only
    pub text_color: Option<Color16>,
    /// User X offset (`offx`)
    pub offset_x: i16,
    /// User Y offset (`offy`)
    pub offset_y: i16,
    /// Scroll enabled (`animate`)
    pub animate: bool,
    /// Scroll direction (`dir`)
    pub direction: Direction,
    /// Speed percent (`speed`)
    pub speed: u8,
    /// Gap between copies in pixels (`interval`)
    pub gap: u16,
    /// Brightness percent (`brightness`); `None` leaves it unchanged
    pub brightness: Option<u8>,
    /// Background source (`bgMode`)
    pub background_mode: Option<BackgroundMode>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            background: Color16::BLACK,
            text_color: None,
            offset_x: 0,
            offset_y: 0,
            animate: false,
            direction: Direction::Left,
            speed: DEFAULT_SPEED,
            gap: DEFAULT_GAP,
            brightness: None,
            background_mode: None,
        }
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn parse_clamped(value: &str, min: i64, max: i64) -> Option<i64> {
    parse_int(value).map(|v| v.clamp(min, max))
}

impl UploadOptions {
    /// Build options from key/value pairs
    ///
    /// Later duplicates win. Unknown keys are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.apply(key, value);
        }
        options
    }

    /// Apply a single key/value pair
    pub fn apply(&mut self, key: &str, value: &str) {
        let offset = MAX_USER_OFFSET as i64;
        match key {
            "bg" => self.background = Color16::from_hex(value).unwrap_or(Color16::BLACK),
            "color" => self.text_color = Color16::from_hex(value),
            "offx" => {
                self.offset_x = parse_clamped(value, -offset, offset).unwrap_or(0) as i16;
            }
            "offy" => {
                self.offset_y = parse_clamped(value, -offset, offset).unwrap_or(0) as i16;
            }
            "animate" => {
                let value = value.trim();
                self.animate = value == "1" || value.eq_ignore_ascii_case("true");
            }
            "dir" => self.direction = Direction::from_token(value),
            "speed" => {
                let (min, max) = SPEED_RANGE;
                self.speed = parse_clamped(value, min as i64, max as i64)
                    .map_or(DEFAULT_SPEED, |v| v as u8);
            }
            "interval" => {
                let (min, max) = GAP_RANGE;
                self.gap =
                    parse_clamped(value, min as i64, max as i64).map_or(DEFAULT_GAP, |v| v as u16);
            }
            "brightness" => {
                self.brightness = parse_clamped(value, 0, 100).map(|v| v as u8);
            }
            "bgMode" => {
                if let Some(mode) = BackgroundMode::from_token(value) {
                    self.background_mode = Some(mode);
                }
            }
            _ => {}
        }
    }
}

/// Map a brightness percentage onto the 0-255 device range
pub const fn brightness_to_device(percent: u8) -> u8 {
    let percent = if percent > 100 { 100 } else { percent };
    (percent as u16 * 255 / 100) as u8
}

/// Parse a layout token such as `2x1` into `(rows, cols)`
///
/// Rows and columns must each be at least 1 and the tile count may not
/// exceed [`MAX_TILES`].
pub fn parse_layout(token: &str) -> Option<(u8, u8)> {
    let token = token.trim();
    let (rows, cols) = token.split_once(['x', 'X'])?;
    let rows: u8 = rows.trim().parse().ok()?;
    let cols: u8 = cols.trim().parse().ok()?;
    if rows == 0 || cols == 0 || rows as usize * cols as usize > MAX_TILES {
        return None;
    }
    Some((rows, cols))
}

/// Label for a tile index
pub fn tile_label(index: usize) -> &'static str {
    TILE_LABELS.get(index).copied().unwrap_or("panel")
}

/// Resolve a tile token to a zero-based index
///
/// Accepts a label (`main`, `second`, ...) or a 1-based decimal index.
/// `"0"` is taken as index 0 as well. Range checking against the current
/// layout is the caller's job.
pub fn tile_index_from_token(token: &str) -> Option<usize> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Some(index) = TILE_LABELS
        .iter()
        .position(|label| label.eq_ignore_ascii_case(token))
    {
        return Some(index);
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: usize = token.parse().ok()?;
    Some(value.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let options = UploadOptions::from_pairs(core::iter::empty());
        assert_eq!(options, UploadOptions::default());
        assert_eq!(options.speed, 50);
        assert_eq!(options.gap, 1);
        assert!(options.brightness.is_none());
    }

    #[test]
    fn test_full_option_set() {
        let options = UploadOptions::from_pairs([
            ("bg", "#00FF00"),
            ("color", "#FFFFFF"),
            ("offx", "-5"),
            ("offy", "3"),
            ("animate", "1"),
            ("dir", "right"),
            ("speed", "75"),
            ("interval", "12"),
            ("brightness", "40"),
            ("bgMode", "color"),
        ]);
        assert_eq!(options.background, Color16::GREEN);
        assert_eq!(options.text_color, Some(Color16::WHITE));
        assert_eq!(options.offset_x, -5);
        assert_eq!(options.offset_y, 3);
        assert!(options.animate);
        assert_eq!(options.direction, Direction::Right);
        assert_eq!(options.speed, 75);
        assert_eq!(options.gap, 12);
        assert_eq!(options.brightness, Some(40));
        assert_eq!(options.background_mode, Some(BackgroundMode::Color));
    }

    #[test]
    fn test_clamping() {
        let options = UploadOptions::from_pairs([
            ("offx", "99999"),
            ("offy", "-99999"),
            ("speed", "0"),
            ("interval", "1000"),
            ("brightness", "250"),
        ]);
        assert_eq!(options.offset_x, MAX_USER_OFFSET);
        assert_eq!(options.offset_y, -MAX_USER_OFFSET);
        assert_eq!(options.speed, 1);
        assert_eq!(options.gap, 300);
        assert_eq!(options.brightness, Some(100));
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let options = UploadOptions::from_pairs([
            ("bg", "purple"),
            ("offx", "abc"),
            ("speed", "fast"),
            ("interval", ""),
            ("brightness", "dim"),
            ("dir", "up"),
            ("animate", "yes"),
            ("bgMode", "plaid"),
        ]);
        assert_eq!(options, UploadOptions::default());
    }

    #[test]
    fn test_animate_tokens() {
        assert!(UploadOptions::from_pairs([("animate", "true")]).animate);
        assert!(!UploadOptions::from_pairs([("animate", "0")]).animate);
    }

    #[test]
    fn test_brightness_to_device() {
        assert_eq!(brightness_to_device(0), 0);
        assert_eq!(brightness_to_device(50), 127);
        assert_eq!(brightness_to_device(100), 255);
        assert_eq!(brightness_to_device(200), 255);
    }

    #[test]
    fn test_parse_layout() {
        assert_eq!(parse_layout("1x1"), Some((1, 1)));
        assert_eq!(parse_layout("2X4"), Some((2, 4)));
        assert_eq!(parse_layout("0x1"), None);
        assert_eq!(parse_layout("3x3"), None);
        assert_eq!(parse_layout("2by2"), None);
        assert_eq!(parse_layout(""), None);
    }

    #[test]
    fn test_tile_tokens() {
        assert_eq!(tile_index_from_token("main"), Some(0));
        assert_eq!(tile_index_from_token(" Third "), Some(2));
        assert_eq!(tile_index_from_token("1"), Some(0));
        assert_eq!(tile_index_from_token("0"), Some(0));
        assert_eq!(tile_index_from_token("8"), Some(7));
        assert_eq!(tile_index_from_token("-1"), None);
        assert_eq!(tile_index_from_token("ninth"), None);
        assert_eq!(tile_index_from_token(""), None);
    }

    #[test]
    fn test_tile_labels() {
        assert_eq!(tile_label(0), "main");
        assert_eq!(tile_label(7), "eighth");
        assert_eq!(tile_label(8), "panel");
    }
}
