//! Hardware configuration
//!
//! Tile geometry and boot defaults for the panel chain. The board crate may
//! supply its own TOML; otherwise the copy embedded at build time is used.

use core::fmt;

use heapless::String;
use serde::{Deserialize, Serialize};

use marquee_protocol::options::MAX_TILES;
use marquee_protocol::Color16;

/// Panel configuration embedded at build time (validated by build.rs)
pub const EMBEDDED_PANEL_TOML: &str = include_str!("../../panel.toml");

/// Maximum length of a color string in TOML ("#RRGGBB")
pub const MAX_COLOR_LEN: usize = 8;

/// Errors from loading hardware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML syntax or schema error
    TomlParse,
    /// Tile size or layout out of range
    InvalidPanel,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse => write!(f, "invalid panel TOML"),
            Self::InvalidPanel => write!(f, "panel geometry out of range"),
        }
    }
}

/// `[panel]` section: one tile's size and the boot layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct PanelConfig {
    /// Width of a single tile in pixels
    pub tile_width: u16,
    /// Height of a single tile in pixels
    pub tile_height: u16,
    /// Tile rows at boot
    pub rows: u8,
    /// Tile columns at boot
    pub cols: u8,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            tile_width: 128,
            tile_height: 64,
            rows: 1,
            cols: 1,
        }
    }
}

/// `[defaults]` section: render configuration at first boot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct DefaultsConfig {
    /// Brightness percent
    pub brightness: u8,
    /// Background color, `#RRGGBB`
    pub background: String<MAX_COLOR_LEN>,
    /// Text color, `#RRGGBB`
    pub text_color: String<MAX_COLOR_LEN>,
    /// Speed percent
    pub speed: u8,
    /// Marquee gap in pixels
    pub gap: u16,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let mut background = String::new();
        let _ = background.push_str("#000000");
        let mut text_color = String::new();
        let _ = text_color.push_str("#FFFFFF");
        Self {
            // 200 of 255 on the device scale
            brightness: 78,
            background,
            text_color,
            speed: 50,
            gap: 1,
        }
    }
}

/// Complete hardware configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct HardwareConfig {
    pub panel: PanelConfig,
    pub defaults: DefaultsConfig,
}

impl HardwareConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: HardwareConfig = toml::from_str(text).map_err(|_| ConfigError::TomlParse)?;
        config.validate()?;
        Ok(config)
    }

    /// The configuration embedded at build time
    ///
    /// Falls back to compiled-in defaults if it somehow fails to parse.
    pub fn embedded() -> Self {
        match Self::from_toml(EMBEDDED_PANEL_TOML) {
            Ok(config) => config,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Embedded panel.toml rejected: {}, using defaults", _e);
                Self::default()
            }
        }
    }

    /// Check tile geometry and layout bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.panel;
        let tiles = p.rows as usize * p.cols as usize;
        if p.tile_width == 0 || p.tile_height == 0 || tiles == 0 || tiles > MAX_TILES {
            return Err(ConfigError::InvalidPanel);
        }
        Ok(())
    }

    /// Boot background color (black if unparsable)
    pub fn default_background(&self) -> Color16 {
        Color16::from_hex(&self.defaults.background).unwrap_or(Color16::BLACK)
    }

    /// Boot text color (white if unparsable)
    pub fn default_text_color(&self) -> Color16 {
        Color16::from_hex(&self.defaults.text_color).unwrap_or(Color16::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_matches_defaults() {
        assert_eq!(HardwareConfig::embedded(), HardwareConfig::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = HardwareConfig::from_toml("[panel]\ncols = 2\n").unwrap();
        assert_eq!(config.panel.cols, 2);
        assert_eq!(config.panel.tile_width, 128);
        assert_eq!(config.defaults.speed, 50);
    }

    #[test]
    fn test_rejects_bad_layout() {
        let too_many = "[panel]\nrows = 3\ncols = 3\n";
        assert_eq!(HardwareConfig::from_toml(too_many), Err(ConfigError::InvalidPanel));

        let zero_tile = "[panel]\ntile_width = 0\n";
        assert_eq!(HardwareConfig::from_toml(zero_tile), Err(ConfigError::InvalidPanel));
    }

    #[test]
    fn test_rejects_bad_syntax() {
        assert_eq!(
            HardwareConfig::from_toml("[panel\nrows = 1"),
            Err(ConfigError::TomlParse)
        );
    }

    #[test]
    fn test_colors() {
        let config =
            HardwareConfig::from_toml("[defaults]\nbackground = \"#00FF00\"\ntext_color = \"bad\"\n")
                .unwrap();
        assert_eq!(config.default_background(), Color16::GREEN);
        assert_eq!(config.default_text_color(), Color16::WHITE);
    }
}
