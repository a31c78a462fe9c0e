//! Render engine
//!
//! The single owned aggregate behind the display: layout, configuration,
//! canvas, background, active bitmap, marquee heads and display mode. All
//! mutation goes through its methods, and every method that fails leaves
//! the previous state in place.

use marquee_hal::DisplaySink;
use marquee_protocol::{decode_upload, BackgroundMode, Bitmap, Color16, DecodeLimits, UploadOptions};

use crate::compositor::{compose, render_background};
use crate::config::{HardwareConfig, RenderConfig};
use crate::error::EngineError;
use crate::layout::{PanelInfo, PanelLayout};
use crate::marquee::Marquee;
use crate::pixel::PixelBuffer;
use crate::snapshot::{LoadedSnapshot, Snapshot};
use crate::state::{DisplayMode, Event};

/// Display state aggregate
#[derive(Debug)]
pub struct RenderEngine {
    layout: PanelLayout,
    config: RenderConfig,
    /// Last composed frame, always canvas-sized
    frame: PixelBuffer,
    /// Background image, already placed on a canvas-sized buffer
    background: Option<PixelBuffer>,
    bitmap: Option<Bitmap>,
    marquee: Option<Marquee>,
    mode: DisplayMode,
}

impl RenderEngine {
    /// Create an engine from hardware defaults
    ///
    /// Starts idle with an empty canvas in the default background color.
    pub fn new(hardware: &HardwareConfig) -> Self {
        let panel = &hardware.panel;
        let layout = PanelLayout::new(panel.tile_width, panel.tile_height, panel.rows, panel.cols)
            .unwrap_or_default();
        let config = RenderConfig::from_hardware(hardware);
        let frame = PixelBuffer::filled(layout.canvas_width(), layout.canvas_height(), config.background);

        Self {
            layout,
            config,
            frame,
            background: None,
            bitmap: None,
            marquee: None,
            mode: DisplayMode::Idle,
        }
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Last composed frame
    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    pub fn background(&self) -> Option<&PixelBuffer> {
        self.background.as_ref()
    }

    pub fn marquee(&self) -> Option<&Marquee> {
        self.marquee.as_ref()
    }

    /// Upload limits for the current canvas
    pub fn limits(&self) -> DecodeLimits {
        DecodeLimits::for_canvas(self.layout.canvas_width(), self.layout.canvas_height())
    }

    /// Marquee progress to persist (0 when not scrolling)
    pub fn scroll_offset(&self) -> u32 {
        self.marquee.as_ref().map_or(0, Marquee::progress)
    }

    /// Current animation tick interval
    pub fn frame_interval_ms(&self) -> u32 {
        self.config.speed.frame_interval_ms()
    }

    /// Layout report
    pub fn panel_info(&self) -> PanelInfo {
        self.layout.info()
    }

    /// Replace the active bitmap and apply the upload's options
    ///
    /// The blob is decoded before anything is touched, so a rejected
    /// upload changes nothing.
    pub fn upload(&mut self, bytes: &[u8], options: &UploadOptions) -> Result<(), EngineError> {
        let bitmap = decode_upload(bytes, &self.limits())?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Bitmap {}x{} ({}), animate={}",
            bitmap.width(),
            bitmap.height(),
            bitmap.encoding(),
            options.animate
        );

        self.config.apply_upload(options);
        if self.config.background_mode == BackgroundMode::Color {
            self.background = None;
        }
        self.bitmap = Some(bitmap);
        self.start_content(0);
        self.render();
        Ok(())
    }

    /// Replace the background image
    ///
    /// The image is centered over the current background color and the
    /// background mode switches to image.
    pub fn upload_background(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        let image = decode_upload(bytes, &self.limits())?;

        #[cfg(feature = "defmt")]
        defmt::info!("Background {}x{}", image.width(), image.height());

        self.background = Some(render_background(
            self.layout.canvas_width(),
            self.layout.canvas_height(),
            &image,
            self.config.background,
        ));
        self.config.background_mode = BackgroundMode::Image;
        if self.bitmap.is_none() {
            self.mode = self.mode.transition(Event::ShowStatic);
        }
        self.render();
        Ok(())
    }

    /// Change the tile grid
    ///
    /// On a real change the canvas is reallocated, the background image is
    /// dropped and the marquee is reseeded for the new width. Either way the
    /// canvas is cleared and seam guides are drawn until the next render.
    pub fn set_layout(&mut self, rows: u8, cols: u8) -> Result<bool, EngineError> {
        let changed = self.layout.resize(rows, cols)?;
        let (width, height) = (self.layout.canvas_width(), self.layout.canvas_height());

        if changed {
            #[cfg(feature = "defmt")]
            defmt::info!("Layout {}x{} -> canvas {}x{}", rows, cols, width, height);

            self.frame = PixelBuffer::filled(width, height, Color16::BLACK);
            if self.background.as_ref().is_some_and(|bg| !bg.has_size(width, height)) {
                self.background = None;
                self.config.background_mode = BackgroundMode::Color;
            }
            if self.marquee.is_some() {
                self.reseed(0);
            }
        }

        self.frame.fill(Color16::BLACK);
        self.layout.draw_seams(&mut self.frame);
        Ok(changed)
    }

    /// Enable or disable one tile and re-render
    pub fn set_tile_active(&mut self, index: usize, active: bool) -> Result<(), EngineError> {
        self.layout.set_tile_active(index, active)?;
        self.render();
        Ok(())
    }

    /// Halt scrolling and show the bitmap statically centered
    pub fn stop(&mut self) {
        self.marquee = None;
        self.mode = self.mode.transition(Event::Stop);
        self.render();
    }

    /// Hand the panel to another subsystem
    pub fn enter_external(&mut self) {
        self.mode = self.mode.transition(Event::EnterExternal);
    }

    /// Take the panel back and resume what the configuration asks for
    pub fn exit_external(&mut self) {
        let next = self.mode.transition(Event::ExitExternal);
        if next == self.mode {
            return;
        }
        self.mode = next;
        self.start_content(self.scroll_offset());
        self.render();
    }

    /// Run one animation step
    ///
    /// Returns false (and does nothing) unless scrolling.
    pub fn tick(&mut self) -> bool {
        if !self.mode.animates() {
            return false;
        }
        let Some(marquee) = self.marquee.as_mut() else {
            return false;
        };
        marquee.tick();
        self.render();
        true
    }

    /// Compose the frame and apply the tile mask
    pub fn render(&mut self) {
        let heads = self.marquee.as_ref().map_or(&[][..], Marquee::heads);
        let background = match self.config.background_mode {
            BackgroundMode::Image => self.background.as_ref(),
            BackgroundMode::Color => None,
        };
        compose(&mut self.frame, &self.config, background, self.bitmap.as_ref(), heads);
        self.layout.apply_mask(&mut self.frame);
    }

    /// Push the current frame to `sink`, unless another subsystem owns it
    pub fn present<S: DisplaySink>(&self, sink: &mut S) -> bool {
        if !self.mode.presents() {
            return false;
        }
        sink.present(self.frame.width(), self.frame.height(), self.frame.as_slice());
        true
    }

    /// Borrow everything a save needs
    pub fn snapshot(&self, saved_at_ms: u32) -> Snapshot<'_> {
        Snapshot {
            config: &self.config,
            layout: &self.layout,
            frame: &self.frame,
            background: self.background.as_ref(),
            bitmap: self.bitmap.as_ref(),
            scroll_offset: self.scroll_offset(),
            saved_at_ms,
        }
    }

    /// Adopt state recovered at boot
    ///
    /// The marquee is seeded fresh; the saved scroll offset only biases its
    /// starting point. A stored frame is shown as-is until the next render.
    pub fn restore(&mut self, loaded: LoadedSnapshot) {
        self.config = loaded.config;
        self.background = loaded.background;
        self.bitmap = loaded.bitmap;
        self.start_content(loaded.scroll_offset);

        match loaded.frame {
            Some(frame) if frame.has_size(self.layout.canvas_width(), self.layout.canvas_height()) => {
                self.frame = frame;
            }
            _ => self.render(),
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Restored state: mode={}", self.mode);
    }

    /// Pick scrolling or static for the current bitmap and configuration
    fn start_content(&mut self, scroll_offset: u32) {
        let scrollable = self.bitmap.as_ref().is_some_and(|b| !b.is_empty());
        if self.config.animate && scrollable {
            self.reseed(scroll_offset);
            self.mode = self.mode.transition(Event::ShowScrolling);
        } else {
            self.marquee = None;
            self.mode = self.mode.transition(Event::ShowStatic);
        }
    }

    fn reseed(&mut self, scroll_offset: u32) {
        let Some(bitmap) = self.bitmap.as_ref() else {
            self.marquee = None;
            return;
        };
        let mut marquee = Marquee::seed(
            self.layout.canvas_width(),
            bitmap.width(),
            self.config.gap,
            self.config.direction,
        );
        marquee.advance_by(scroll_offset % marquee.spacing() as u32);
        self.marquee = Some(marquee);
    }
}
