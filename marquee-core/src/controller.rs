//! Cooperative control loop
//!
//! One loop alternates between servicing requests and animation ticks.
//! A request always runs to completion before the next tick check, and a
//! frame is composed and flushed in one step, so the sink never sees a
//! partial frame.
//!
//! ```text
//! loop {
//!     if let Some(req) = transport.next() {
//!         controller.handle(req, clock.now(), &mut sink).await;
//!     }
//!     controller.poll(clock.now(), &mut sink);
//! }
//! ```

use marquee_hal::{DisplaySink, FileStore, KeyValueStore};
use marquee_protocol::options::{parse_layout, tile_index_from_token};
use marquee_protocol::UploadOptions;

use crate::config::{HardwareConfig, RenderConfig};
use crate::engine::RenderEngine;
use crate::error::EngineError;
use crate::layout::{LayoutError, PanelInfo};
use crate::marquee::FramePacer;
use crate::snapshot::{self, SaveReport};

/// Inbound requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request<'a> {
    /// New text bitmap plus render options
    Upload {
        bytes: &'a [u8],
        options: UploadOptions,
    },
    /// New background image
    UploadBackground { bytes: &'a [u8] },
    /// Change the tile grid
    SetLayout { rows: u8, cols: u8 },
    /// Enable or disable one tile
    SetTileActive { index: usize, active: bool },
    /// Halt the marquee
    Stop,
    /// Another subsystem takes the panel
    EnterExternal,
    /// The other subsystem releases it
    ExitExternal,
    /// Report the layout
    PanelInfo,
}

impl Request<'_> {
    /// Layout request from an `"RxC"` token
    pub fn set_layout(token: &str) -> Result<Self, LayoutError> {
        let (rows, cols) = parse_layout(token).ok_or(LayoutError::InvalidLayout { rows: 0, cols: 0 })?;
        Ok(Request::SetLayout { rows, cols })
    }

    /// Tile request from a label or 1-based index token
    pub fn set_tile_active(token: &str, active: bool) -> Result<Self, LayoutError> {
        let index = tile_index_from_token(token).ok_or(LayoutError::UnknownTile)?;
        Ok(Request::SetTileActive { index, active })
    }

    /// Whether a successful request commits a new render
    fn commits(&self) -> bool {
        matches!(
            self,
            Request::Upload { .. }
                | Request::UploadBackground { .. }
                | Request::SetTileActive { .. }
                | Request::Stop
        )
    }
}

/// Outcome of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok,
    Info(PanelInfo),
    Rejected(EngineError),
}

/// Control loop state: engine, pacer and stores
pub struct Controller<K, F> {
    engine: RenderEngine,
    pacer: FramePacer,
    kv: K,
    files: F,
    /// Start of the last request, credited to the pacer on the next poll
    busy_since_ms: Option<u32>,
    brightness: Option<u8>,
}

impl<K: KeyValueStore, F: FileStore> Controller<K, F> {
    /// Restore persisted state and show it
    pub async fn boot<S: DisplaySink>(
        hardware: &HardwareConfig,
        mut kv: K,
        mut files: F,
        now_ms: u32,
        sink: &mut S,
    ) -> Self {
        let mut engine = RenderEngine::new(hardware);
        let defaults = RenderConfig::from_hardware(hardware);
        let loaded = snapshot::load(&mut kv, &mut files, &defaults, engine.layout()).await;
        engine.restore(loaded);

        let mut controller = Self {
            engine,
            pacer: FramePacer::new(now_ms),
            kv,
            files,
            busy_since_ms: None,
            brightness: None,
        };
        controller.flush(sink);

        #[cfg(feature = "defmt")]
        defmt::info!("Controller booted at {} ms", now_ms);

        controller
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn kv_store(&self) -> &K {
        &self.kv
    }

    pub fn file_store(&self) -> &F {
        &self.files
    }

    /// Execute one request to completion
    ///
    /// On success the new frame is presented and, for committed renders,
    /// persisted. On failure nothing changes.
    pub async fn handle<S: DisplaySink>(&mut self, request: Request<'_>, now_ms: u32, sink: &mut S) -> Response {
        self.busy_since_ms = Some(now_ms);

        let result = match &request {
            Request::Upload { bytes, options } => self.engine.upload(bytes, options).map(|_| Response::Ok),
            Request::UploadBackground { bytes } => self.engine.upload_background(bytes).map(|_| Response::Ok),
            Request::SetLayout { rows, cols } => self.engine.set_layout(*rows, *cols).map(|_| Response::Ok),
            Request::SetTileActive { index, active } => {
                self.engine.set_tile_active(*index, *active).map(|_| Response::Ok)
            }
            Request::Stop => {
                self.engine.stop();
                Ok(Response::Ok)
            }
            Request::EnterExternal => {
                self.engine.enter_external();
                Ok(Response::Ok)
            }
            Request::ExitExternal => {
                self.engine.exit_external();
                Ok(Response::Ok)
            }
            Request::PanelInfo => Ok(Response::Info(self.engine.panel_info())),
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Request rejected: {}", e);
                return Response::Rejected(e);
            }
        };

        if !matches!(request, Request::PanelInfo | Request::EnterExternal) {
            self.flush(sink);
        }
        if request.commits() {
            self.persist(now_ms).await;
        }
        response
    }

    /// Run at most one animation tick
    ///
    /// Returns true if a tick ran. Missed ticks are dropped, and time spent
    /// in the last request is credited (at most one interval).
    pub fn poll<S: DisplaySink>(&mut self, now_ms: u32, sink: &mut S) -> bool {
        let busy_since = self.busy_since_ms.take();
        if !self.engine.mode().animates() {
            self.pacer.reset(now_ms);
            return false;
        }
        if let Some(start) = busy_since {
            self.pacer.credit(now_ms.wrapping_sub(start));
        }
        if !self.pacer.poll(now_ms, self.engine.frame_interval_ms()) {
            return false;
        }
        if self.engine.tick() {
            self.engine.present(sink);
            return true;
        }
        false
    }

    /// Erase all persisted state
    pub async fn reset_storage(&mut self) -> Result<(), EngineError> {
        snapshot::erase(&mut self.kv, &mut self.files).await?;
        Ok(())
    }

    /// Persist the current state
    pub async fn persist(&mut self, now_ms: u32) -> SaveReport {
        let snapshot = self.engine.snapshot(now_ms);
        snapshot::save(&mut self.kv, &mut self.files, &snapshot).await
    }

    fn flush<S: DisplaySink>(&mut self, sink: &mut S) {
        if !self.engine.present(sink) {
            return;
        }
        let level = self.engine.config().device_brightness();
        if self.brightness != Some(level) {
            sink.set_brightness(level);
            self.brightness = Some(level);
        }
    }
}
