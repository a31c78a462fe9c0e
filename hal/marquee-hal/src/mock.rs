//! Mock implementations for testing
//!
//! In-memory stores with failure injection and a display sink that records
//! every presented frame.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use marquee_protocol::Color16;

use crate::display::DisplaySink;
use crate::store::{FileKey, FileStore, KeyValueStore, StorageKey, StoreError};

/// In-memory key-value store
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: BTreeMap<StorageKey, Vec<u8>>,
    fail_writes: usize,
    writes: usize,
    unavailable: bool,
}

impl MemoryKvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` writes with `Unavailable`
    pub fn fail_next_writes(&mut self, count: usize) {
        self.fail_writes = count;
    }

    /// Make every operation fail with `Unavailable`
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Raw access to a stored value
    pub fn get(&self, key: StorageKey) -> Option<&[u8]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    /// Insert a raw value, bypassing failure injection
    pub fn insert(&mut self, key: StorageKey, data: &[u8]) {
        self.entries.insert(key, data.to_vec());
    }

    /// Drop a stored value
    pub fn remove(&mut self, key: StorageKey) {
        self.entries.remove(&key);
    }
}

impl KeyValueStore for MemoryKvStore {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        let data = self.entries.get(&key).ok_or(StoreError::NotFound)?;
        let target = buffer
            .get_mut(..data.len())
            .ok_or(StoreError::BufferTooSmall)?;
        target.copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(StoreError::Unavailable);
        }
        self.entries.insert(key, data.to_vec());
        self.writes += 1;
        Ok(())
    }

    async fn erase_all(&mut self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        self.entries.clear();
        Ok(())
    }
}

/// In-memory file store
#[derive(Debug, Default, Clone)]
pub struct MemoryFileStore {
    files: BTreeMap<FileKey, Vec<u8>>,
    fail_writes: usize,
    unavailable: bool,
}

impl MemoryFileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` writes with `Unavailable`
    pub fn fail_next_writes(&mut self, count: usize) {
        self.fail_writes = count;
    }

    /// Make every operation fail with `Unavailable`
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Raw access to a stored file
    pub fn get(&self, file: FileKey) -> Option<&[u8]> {
        self.files.get(&file).map(Vec::as_slice)
    }

    /// Insert a raw file, bypassing failure injection
    pub fn insert(&mut self, file: FileKey, data: &[u8]) {
        self.files.insert(file, data.to_vec());
    }
}

impl FileStore for MemoryFileStore {
    async fn read(&mut self, file: FileKey) -> Result<Vec<u8>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        self.files.get(&file).cloned().ok_or(StoreError::NotFound)
    }

    async fn write(&mut self, file: FileKey, data: &[u8]) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(StoreError::Unavailable);
        }
        self.files.insert(file, data.to_vec());
        Ok(())
    }

    async fn rename(&mut self, from: FileKey, to: FileKey) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        let data = self.files.remove(&from).ok_or(StoreError::NotFound)?;
        self.files.insert(to, data);
        Ok(())
    }

    async fn remove(&mut self, file: FileKey) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        self.files.remove(&file);
        Ok(())
    }
}

/// A presented frame as seen by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedFrame {
    /// Canvas width
    pub width: usize,
    /// Canvas height
    pub height: usize,
    /// Row-major pixels
    pub pixels: Vec<Color16>,
}

impl PresentedFrame {
    /// Pixel at (x, y), if inside the frame
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color16> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }
}

/// Display sink that keeps every frame it is given
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    frames: Vec<PresentedFrame>,
    brightness: Option<u8>,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All frames presented so far
    pub fn frames(&self) -> &[PresentedFrame] {
        &self.frames
    }

    /// Most recent frame
    pub fn last(&self) -> Option<&PresentedFrame> {
        self.frames.last()
    }

    /// Number of presented frames
    pub fn present_count(&self) -> usize {
        self.frames.len()
    }

    /// Last brightness set, in device units
    pub fn brightness(&self) -> Option<u8> {
        self.brightness
    }
}

impl DisplaySink for RecordingSink {
    fn present(&mut self, width: usize, height: usize, pixels: &[Color16]) {
        self.frames.push(PresentedFrame {
            width,
            height,
            pixels: pixels.to_vec(),
        });
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = Some(level);
    }
}
