//! Versioned state snapshot
//!
//! Settings are written one key at a time, so a power cut mid-save leaves
//! every field either old or new, never torn. Large payloads (last frame,
//! background image, last bitmap) go to the file store through a staging
//! file and a rename, so each file is either the old one or the new one.
//!
//! Loading is best-effort: a missing or unreadable field falls back to its
//! default, and a payload that does not fit the current canvas is dropped.

pub mod files;
pub mod migrate;

use core::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use marquee_hal::{FileKey, FileStore, KeyValueStore, StorageKey, StoreError};
use marquee_protocol::{decode_upload, Bitmap, DecodeLimits};

use crate::config::RenderConfig;
use crate::layout::PanelLayout;
use crate::pixel::PixelBuffer;

pub use migrate::{upgrade, StoredFields, LEGACY_SCHEMA_VERSION, SCHEMA_VERSION};

/// Scratch size for one postcard-encoded field
const FIELD_BUF_LEN: usize = 16;

/// Snapshot errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SnapshotError {
    /// Store operation failed
    Store(StoreError),
    /// Encoding failed
    Serialize,
    /// Stored bytes could not be decoded
    Deserialize,
    /// Payload size disagrees with the current canvas
    LayoutMismatch,
    /// Payload checksum mismatch
    CrcMismatch,
}

impl From<StoreError> for SnapshotError {
    fn from(e: StoreError) -> Self {
        SnapshotError::Store(e)
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store: {}", e),
            Self::Serialize => write!(f, "serialize failed"),
            Self::Deserialize => write!(f, "deserialize failed"),
            Self::LayoutMismatch => write!(f, "payload does not match canvas"),
            Self::CrcMismatch => write!(f, "payload checksum mismatch"),
        }
    }
}

/// Everything a committed render persists
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub config: &'a RenderConfig,
    pub layout: &'a PanelLayout,
    pub frame: &'a PixelBuffer,
    pub background: Option<&'a PixelBuffer>,
    pub bitmap: Option<&'a Bitmap>,
    /// Marquee progress, reapplied as a starting bias on load
    pub scroll_offset: u32,
    pub saved_at_ms: u32,
}

/// Result of a save; failures are counted, never raised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SaveReport {
    /// Writes attempted
    pub written: usize,
    /// Writes that failed twice
    pub failed: usize,
}

impl SaveReport {
    fn record(&mut self, result: Result<(), SnapshotError>) {
        self.written += 1;
        if result.is_err() {
            self.failed += 1;
        }
    }
}

/// State recovered at boot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSnapshot {
    /// Schema version found in the store (`None` if absent)
    pub found_version: Option<u8>,
    pub config: RenderConfig,
    pub scroll_offset: u32,
    pub saved_at_ms: Option<u32>,
    pub frame: Option<PixelBuffer>,
    pub background: Option<PixelBuffer>,
    pub bitmap: Option<Bitmap>,
}

async fn put_field<K, T>(kv: &mut K, key: StorageKey, value: &T) -> Result<(), SnapshotError>
where
    K: KeyValueStore,
    T: Serialize,
{
    let mut buffer = [0u8; FIELD_BUF_LEN];
    let bytes = postcard::to_slice(value, &mut buffer).map_err(|_| SnapshotError::Serialize)?;

    if let Err(_first) = kv.write(key, bytes).await {
        #[cfg(feature = "defmt")]
        defmt::warn!("Write {} failed: {}, retrying", key, _first);
        kv.write(key, bytes).await.map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Write {} failed again: {}, giving up", key, e);
            SnapshotError::Store(e)
        })?;
    }
    Ok(())
}

async fn put_stored<K, T>(kv: &mut K, key: StorageKey, value: &Option<T>) -> Result<(), SnapshotError>
where
    K: KeyValueStore,
    T: Serialize,
{
    match value {
        Some(value) => put_field(kv, key, value).await,
        None => Ok(()),
    }
}

async fn get_field<K, T>(kv: &mut K, key: StorageKey) -> Option<T>
where
    K: KeyValueStore,
    T: DeserializeOwned,
{
    let mut buffer = [0u8; FIELD_BUF_LEN];
    match kv.read(key, &mut buffer).await {
        Ok(len) => match postcard::from_bytes(&buffer[..len]) {
            Ok(value) => Some(value),
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Field {} unreadable, using default", key);
                None
            }
        },
        Err(StoreError::NotFound) => None,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Read {} failed: {}", key, _e);
            None
        }
    }
}

async fn put_file_once<F: FileStore>(files: &mut F, file: FileKey, data: &[u8]) -> Result<(), StoreError> {
    files.write(FileKey::Staging, data).await?;
    files.rename(FileKey::Staging, file).await
}

async fn put_file<F: FileStore>(files: &mut F, file: FileKey, data: &[u8]) -> Result<(), SnapshotError> {
    if let Err(_first) = put_file_once(files, file, data).await {
        #[cfg(feature = "defmt")]
        defmt::warn!("Write {} failed: {}, retrying", file.path(), _first);
        put_file_once(files, file, data).await.map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Write {} failed again: {}, giving up", file.path(), e);
            SnapshotError::Store(e)
        })?;
    }
    Ok(())
}

async fn put_canvas<F: FileStore>(
    files: &mut F,
    file: FileKey,
    buffer: Option<&PixelBuffer>,
    layout: &PanelLayout,
) -> Result<(), SnapshotError> {
    let Some(buffer) = buffer else {
        return files.remove(file).await.map_err(SnapshotError::Store);
    };
    if !buffer.has_size(layout.canvas_width(), layout.canvas_height()) {
        return Err(SnapshotError::LayoutMismatch);
    }
    let bytes = files::encode_canvas(buffer)?;
    put_file(files, file, &bytes).await
}

/// Persist a snapshot
///
/// Every write is retried once; what still fails is counted in the report
/// and otherwise ignored. The schema version is written last.
pub async fn save<K, F>(kv: &mut K, files: &mut F, snapshot: &Snapshot<'_>) -> SaveReport
where
    K: KeyValueStore,
    F: FileStore,
{
    let fields = StoredFields::from_config(snapshot.config, snapshot.scroll_offset, snapshot.saved_at_ms);
    let mut report = SaveReport::default();

    report.record(put_stored(kv, StorageKey::BackgroundColor, &fields.background).await);
    report.record(put_stored(kv, StorageKey::TextColor, &fields.text_color).await);
    report.record(put_stored(kv, StorageKey::OffsetX, &fields.offset_x).await);
    report.record(put_stored(kv, StorageKey::OffsetY, &fields.offset_y).await);
    report.record(put_stored(kv, StorageKey::Animate, &fields.animate).await);
    report.record(put_stored(kv, StorageKey::Direction, &fields.direction).await);
    report.record(put_stored(kv, StorageKey::SpeedPercent, &fields.speed_percent).await);
    report.record(put_stored(kv, StorageKey::LegacySpeedMs, &fields.legacy_speed_ms).await);
    report.record(put_stored(kv, StorageKey::Gap, &fields.gap).await);
    report.record(put_stored(kv, StorageKey::Brightness, &fields.brightness).await);
    report.record(put_stored(kv, StorageKey::BackgroundMode, &fields.background_mode).await);
    report.record(put_stored(kv, StorageKey::ScrollOffset, &fields.scroll_offset).await);
    report.record(put_stored(kv, StorageKey::SavedAt, &fields.saved_at_ms).await);

    report.record(put_canvas(files, FileKey::Frame, Some(snapshot.frame), snapshot.layout).await);
    report.record(put_canvas(files, FileKey::Background, snapshot.background, snapshot.layout).await);
    let bitmap_result = match snapshot.bitmap {
        Some(bitmap) => put_file(files, FileKey::Bitmap, &bitmap.encode()).await,
        None => files.remove(FileKey::Bitmap).await.map_err(SnapshotError::Store),
    };
    report.record(bitmap_result);

    report.record(put_stored(kv, StorageKey::SchemaVersion, &fields.schema_version).await);

    if report.failed > 0 {
        #[cfg(feature = "defmt")]
        defmt::warn!("Snapshot saved with {} of {} writes failed", report.failed, report.written);
    } else {
        #[cfg(feature = "defmt")]
        defmt::debug!("Snapshot saved ({} writes)", report.written);
    }
    report
}

async fn load_canvas<F: FileStore>(files: &mut F, file: FileKey, layout: &PanelLayout) -> Option<PixelBuffer> {
    let bytes = match files.read(file).await {
        Ok(bytes) => bytes,
        Err(StoreError::NotFound) => return None,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Read {} failed: {}", file.path(), _e);
            return None;
        }
    };
    match files::decode_canvas(&bytes, layout.canvas_width(), layout.canvas_height()) {
        Ok(buffer) => Some(buffer),
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Discarding {}: {}", file.path(), _e);
            None
        }
    }
}

async fn load_bitmap<F: FileStore>(files: &mut F, layout: &PanelLayout) -> Option<Bitmap> {
    let bytes = files.read(FileKey::Bitmap).await.ok()?;
    let limits = DecodeLimits::for_canvas(layout.canvas_width(), layout.canvas_height());
    match decode_upload(&bytes, &limits) {
        Ok(bitmap) => Some(bitmap),
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Discarding stored bitmap: {}", _e);
            None
        }
    }
}

/// Read back a snapshot
///
/// Never fails. Absent fields take their value from `defaults`; payloads
/// are checked against `layout`'s current canvas.
pub async fn load<K, F>(kv: &mut K, files: &mut F, defaults: &RenderConfig, layout: &PanelLayout) -> LoadedSnapshot
where
    K: KeyValueStore,
    F: FileStore,
{
    let raw = StoredFields {
        schema_version: get_field(kv, StorageKey::SchemaVersion).await,
        background: get_field(kv, StorageKey::BackgroundColor).await,
        text_color: get_field(kv, StorageKey::TextColor).await,
        offset_x: get_field(kv, StorageKey::OffsetX).await,
        offset_y: get_field(kv, StorageKey::OffsetY).await,
        animate: get_field(kv, StorageKey::Animate).await,
        direction: get_field(kv, StorageKey::Direction).await,
        speed_percent: get_field(kv, StorageKey::SpeedPercent).await,
        legacy_speed_ms: get_field(kv, StorageKey::LegacySpeedMs).await,
        gap: get_field(kv, StorageKey::Gap).await,
        brightness: get_field(kv, StorageKey::Brightness).await,
        background_mode: get_field(kv, StorageKey::BackgroundMode).await,
        scroll_offset: get_field(kv, StorageKey::ScrollOffset).await,
        saved_at_ms: get_field(kv, StorageKey::SavedAt).await,
    };

    if raw.is_empty() {
        #[cfg(feature = "defmt")]
        defmt::debug!("No snapshot in store, using defaults");
    } else {
        #[cfg(feature = "defmt")]
        defmt::info!("Loaded snapshot (schema {})", raw.schema_version);
    }

    let found_version = raw.schema_version;
    let fields = upgrade(raw);
    let mut config = fields.to_config(defaults);

    let frame = load_canvas(files, FileKey::Frame, layout).await;
    let background = load_canvas(files, FileKey::Background, layout).await;
    let bitmap = load_bitmap(files, layout).await;

    if background.is_none() {
        config.background_mode = marquee_protocol::BackgroundMode::Color;
    }

    LoadedSnapshot {
        found_version,
        config,
        scroll_offset: fields.scroll_offset.unwrap_or(0),
        saved_at_ms: fields.saved_at_ms,
        frame,
        background,
        bitmap,
    }
}

/// Erase every persisted field and payload
pub async fn erase<K, F>(kv: &mut K, files: &mut F) -> Result<(), SnapshotError>
where
    K: KeyValueStore,
    F: FileStore,
{
    kv.erase_all().await?;
    for file in [FileKey::Frame, FileKey::Background, FileKey::Bitmap, FileKey::Staging] {
        files.remove(file).await?;
    }
    #[cfg(feature = "defmt")]
    defmt::info!("Snapshot erased");
    Ok(())
}
