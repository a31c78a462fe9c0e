//! Snapshot schema versions and upgrades
//!
//! Schema 1 stored the scroll speed as a frame delay in milliseconds and had
//! no version key. Schema 2 stores a percentage and a version key, and keeps
//! writing the delay so older firmware can still read it.

use marquee_protocol::options::{GAP_RANGE, MAX_USER_OFFSET};
use marquee_protocol::{BackgroundMode, Color16, Direction};

use crate::config::{RenderConfig, SpeedPercent};

/// Schema written by this firmware
pub const SCHEMA_VERSION: u8 = 2;

/// Schema assumed when no version key exists
pub const LEGACY_SCHEMA_VERSION: u8 = 1;

/// Raw persisted fields, each independently optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredFields {
    pub schema_version: Option<u8>,
    pub background: Option<Color16>,
    pub text_color: Option<Color16>,
    pub offset_x: Option<i16>,
    pub offset_y: Option<i16>,
    pub animate: Option<bool>,
    pub direction: Option<Direction>,
    pub speed_percent: Option<u8>,
    pub legacy_speed_ms: Option<u8>,
    pub gap: Option<u16>,
    pub brightness: Option<u8>,
    pub background_mode: Option<BackgroundMode>,
    pub scroll_offset: Option<u32>,
    pub saved_at_ms: Option<u32>,
}

impl StoredFields {
    /// Fields to persist for a configuration
    pub fn from_config(config: &RenderConfig, scroll_offset: u32, saved_at_ms: u32) -> Self {
        Self {
            schema_version: Some(SCHEMA_VERSION),
            background: Some(config.background),
            text_color: Some(config.text_color),
            offset_x: Some(config.offset_x),
            offset_y: Some(config.offset_y),
            animate: Some(config.animate),
            direction: Some(config.direction),
            speed_percent: Some(config.speed.get()),
            legacy_speed_ms: Some(config.speed.to_legacy_delay_ms()),
            gap: Some(config.gap),
            brightness: Some(config.brightness),
            background_mode: Some(config.background_mode),
            scroll_offset: Some(scroll_offset),
            saved_at_ms: Some(saved_at_ms),
        }
    }

    /// True if nothing at all was stored
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a configuration, falling back to `defaults` per field
    ///
    /// Stored values are clamped to their valid ranges.
    pub fn to_config(&self, defaults: &RenderConfig) -> RenderConfig {
        let max_offset = MAX_USER_OFFSET;
        RenderConfig {
            background: self.background.unwrap_or(defaults.background),
            background_mode: self.background_mode.unwrap_or(defaults.background_mode),
            text_color: self.text_color.unwrap_or(defaults.text_color),
            offset_x: self
                .offset_x
                .map_or(defaults.offset_x, |v| v.clamp(-max_offset, max_offset)),
            offset_y: self
                .offset_y
                .map_or(defaults.offset_y, |v| v.clamp(-max_offset, max_offset)),
            animate: self.animate.unwrap_or(defaults.animate),
            direction: self.direction.unwrap_or(defaults.direction),
            speed: self.speed_percent.map_or(defaults.speed, SpeedPercent::new),
            gap: self
                .gap
                .map_or(defaults.gap, |v| v.clamp(GAP_RANGE.0, GAP_RANGE.1)),
            brightness: self.brightness.map_or(defaults.brightness, |v| v.min(100)),
        }
    }
}

/// Bring fields read from any known schema up to the current one
///
/// Versions newer than this firmware are left alone; their recognized
/// fields are used as-is.
pub fn upgrade(mut fields: StoredFields) -> StoredFields {
    let version = fields.schema_version.unwrap_or(LEGACY_SCHEMA_VERSION);

    if version < SCHEMA_VERSION {
        // v1 -> v2: delay in ms becomes percent
        fields.speed_percent = fields
            .legacy_speed_ms
            .map(|ms| SpeedPercent::from_legacy_delay_ms(ms).get());
        fields.schema_version = Some(SCHEMA_VERSION);
    } else if fields.speed_percent.is_none() {
        // Interrupted save: the percent key never landed but the delay did
        fields.speed_percent = fields
            .legacy_speed_ms
            .map(|ms| SpeedPercent::from_legacy_delay_ms(ms).get());
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_speed_converted() {
        let v1 = StoredFields {
            legacy_speed_ms: Some(20),
            animate: Some(true),
            ..Default::default()
        };
        let upgraded = upgrade(v1);
        assert_eq!(upgraded.schema_version, Some(SCHEMA_VERSION));
        assert_eq!(upgraded.speed_percent, Some(50));
        assert_eq!(upgraded.animate, Some(true));
    }

    #[test]
    fn test_v1_ignores_stray_percent() {
        // A v1 record has no percent; anything there is not trusted
        let v1 = StoredFields {
            schema_version: Some(1),
            legacy_speed_ms: Some(50),
            speed_percent: Some(99),
            ..Default::default()
        };
        assert_eq!(upgrade(v1).speed_percent, Some(1));
    }

    #[test]
    fn test_v2_keeps_percent() {
        let v2 = StoredFields {
            schema_version: Some(2),
            speed_percent: Some(73),
            legacy_speed_ms: Some(50),
            ..Default::default()
        };
        assert_eq!(upgrade(v2).speed_percent, Some(73));
    }

    #[test]
    fn test_v2_missing_percent_falls_back_to_delay() {
        let v2 = StoredFields {
            schema_version: Some(2),
            legacy_speed_ms: Some(10),
            ..Default::default()
        };
        assert_eq!(upgrade(v2).speed_percent, Some(75));
    }

    #[test]
    fn test_empty_store_yields_defaults() {
        let fields = upgrade(StoredFields::default());
        assert_eq!(fields.speed_percent, None);
        let defaults = RenderConfig::default();
        assert_eq!(fields.to_config(&defaults), defaults);
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = RenderConfig::default();
        config.offset_x = -12;
        config.gap = 40;
        config.speed = SpeedPercent::new(63);
        config.direction = Direction::Right;

        let fields = StoredFields::from_config(&config, 7, 1234);
        assert_eq!(upgrade(fields).to_config(&RenderConfig::default()), config);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let fields = StoredFields {
            schema_version: Some(2),
            gap: Some(0),
            brightness: Some(250),
            offset_x: Some(i16::MAX),
            speed_percent: Some(0),
            ..Default::default()
        };
        let config = fields.to_config(&RenderConfig::default());
        assert_eq!(config.gap, 1);
        assert_eq!(config.brightness, 100);
        assert_eq!(config.offset_x, MAX_USER_OFFSET);
        assert_eq!(config.speed, SpeedPercent::MIN);
    }
}
