//! Durable storage abstractions
//!
//! Two stores back the snapshot: a flat key-value store for small settings
//! and a flat file store for canvas-sized payloads. Either may be missing
//! any individual entry at any time, so readers must treat `NotFound` as a
//! normal outcome.

use alloc::vec::Vec;
use core::fmt;

/// Keys for individually persisted settings
///
/// Every field of the render configuration lives under its own key so a
/// power cut during a save only leaves the fields it did not reach stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Snapshot schema version (absent on first boot)
    SchemaVersion = 0,
    /// Background fill color (RGB565)
    BackgroundColor = 1,
    /// Text color (RGB565, decorative)
    TextColor = 2,
    /// User horizontal offset in pixels
    OffsetX = 3,
    /// User vertical offset in pixels
    OffsetY = 4,
    /// Scroll animation enabled
    Animate = 5,
    /// Scroll direction
    Direction = 6,
    /// Scroll speed in percent (schema 2+)
    SpeedPercent = 7,
    /// Frame delay in milliseconds (schema 1, still written for downgrades)
    LegacySpeedMs = 8,
    /// Gap between marquee copies in pixels
    Gap = 9,
    /// Brightness in percent
    Brightness = 10,
    /// Background source (solid color or image)
    BackgroundMode = 11,
    /// Scroll progress at save time
    ScrollOffset = 12,
    /// Timestamp of the save (ms since boot)
    SavedAt = 13,
}

impl StorageKey {
    /// All keys, in on-flash order
    pub const ALL: [StorageKey; 14] = [
        StorageKey::SchemaVersion,
        StorageKey::BackgroundColor,
        StorageKey::TextColor,
        StorageKey::OffsetX,
        StorageKey::OffsetY,
        StorageKey::Animate,
        StorageKey::Direction,
        StorageKey::SpeedPercent,
        StorageKey::LegacySpeedMs,
        StorageKey::Gap,
        StorageKey::Brightness,
        StorageKey::BackgroundMode,
        StorageKey::ScrollOffset,
        StorageKey::SavedAt,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

/// Names of binary payloads in the file store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FileKey {
    /// Last presented canvas
    Frame,
    /// Canvas-sized background image
    Background,
    /// Last uploaded bitmap, in upload wire format
    Bitmap,
    /// Staging file for atomic replacement
    Staging,
}

impl FileKey {
    /// Path of the file on the device file system
    pub fn path(self) -> &'static str {
        match self {
            FileKey::Frame => "/state/frame.bin",
            FileKey::Background => "/state/background.bin",
            FileKey::Bitmap => "/state/bitmap.bin",
            FileKey::Staging => "/state/staging.bin",
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Backing medium not mounted or not responding
    Unavailable,
    /// Key or file not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Storage is full
    Full,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::NotFound => write!(f, "entry not found"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::Full => write!(f, "storage full"),
        }
    }
}

/// Flat key-value store for small settings
///
/// Implementations typically sit on a wear-levelled flash map. Values are
/// opaque byte strings; encoding is the caller's concern.
pub trait KeyValueStore {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, StoreError>>;

    /// Write a value by key
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StoreError>>;

    /// Erase every stored setting
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), StoreError>>;
}

/// Flat file store for large binary payloads
pub trait FileStore {
    /// Read a whole file
    fn read(&mut self, file: FileKey)
        -> impl core::future::Future<Output = Result<Vec<u8>, StoreError>>;

    /// Create or truncate a file and write `data` into it
    fn write(
        &mut self,
        file: FileKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StoreError>>;

    /// Move `from` over `to`, replacing it
    ///
    /// Must be atomic with respect to power loss: afterwards `to` holds
    /// either its old contents or the complete contents of `from`.
    fn rename(
        &mut self,
        from: FileKey,
        to: FileKey,
    ) -> impl core::future::Future<Output = Result<(), StoreError>>;

    /// Delete a file; deleting a missing file is not an error
    fn remove(&mut self, file: FileKey) -> impl core::future::Future<Output = Result<(), StoreError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        let Some(slot) = buffer.first_mut() else {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        };
        *slot = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        let Some(&byte) = buffer.first() else {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        };
        match StorageKey::from_u8(byte) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
