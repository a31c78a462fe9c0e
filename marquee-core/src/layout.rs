//! Panel layout mapper
//!
//! The canvas is a grid of identical tiles (physical panels), `rows` by
//! `cols`, numbered row-major from the top-left. Each tile can be switched
//! off; disabled tiles are blanked as the last step before presentation.

use core::fmt;

use heapless::Vec;

use marquee_protocol::options::{tile_label, MAX_TILES};
use marquee_protocol::Color16;

use crate::pixel::PixelBuffer;

/// Color of the tile boundary guides drawn after a layout change
pub const SEAM_COLOR: Color16 = Color16::from_rgb888(0, 64, 255);

/// Layout errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Rows/cols zero or more than MAX_TILES tiles
    InvalidLayout { rows: u8, cols: u8 },
    /// Tile index beyond the current layout
    TileOutOfRange { index: usize, count: usize },
    /// Tile token did not name a tile
    UnknownTile,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLayout { rows, cols } => write!(f, "invalid layout {}x{}", rows, cols),
            Self::TileOutOfRange { index, count } => {
                write!(f, "tile {} out of range ({} tiles)", index, count)
            }
            Self::UnknownTile => write!(f, "unknown tile"),
        }
    }
}

/// One tile in a [`PanelInfo`] report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TileInfo {
    pub index: usize,
    pub label: &'static str,
    pub active: bool,
}

/// Layout report for the request layer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelInfo {
    pub rows: u8,
    pub cols: u8,
    pub tiles: Vec<TileInfo, MAX_TILES>,
}

/// Tile grid plus per-tile enable mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    tile_width: u16,
    tile_height: u16,
    rows: u8,
    cols: u8,
    active: Vec<bool, MAX_TILES>,
}

fn all_active(count: usize) -> Vec<bool, MAX_TILES> {
    let mut mask = Vec::new();
    for _ in 0..count.min(MAX_TILES) {
        let _ = mask.push(true);
    }
    mask
}

fn check_layout(rows: u8, cols: u8) -> Result<usize, LayoutError> {
    let count = rows as usize * cols as usize;
    if count == 0 || count > MAX_TILES {
        return Err(LayoutError::InvalidLayout { rows, cols });
    }
    Ok(count)
}

impl Default for PanelLayout {
    /// A single 128x64 tile
    fn default() -> Self {
        Self {
            tile_width: 128,
            tile_height: 64,
            rows: 1,
            cols: 1,
            active: all_active(1),
        }
    }
}

impl PanelLayout {
    /// Create a layout with every tile active
    pub fn new(tile_width: u16, tile_height: u16, rows: u8, cols: u8) -> Result<Self, LayoutError> {
        let count = check_layout(rows, cols)?;
        if tile_width == 0 || tile_height == 0 {
            return Err(LayoutError::InvalidLayout { rows, cols });
        }
        Ok(Self {
            tile_width,
            tile_height,
            rows,
            cols,
            active: all_active(count),
        })
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn tile_width(&self) -> u16 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u16 {
        self.tile_height
    }

    /// Canvas width in pixels
    pub fn canvas_width(&self) -> usize {
        self.cols as usize * self.tile_width as usize
    }

    /// Canvas height in pixels
    pub fn canvas_height(&self) -> usize {
        self.rows as usize * self.tile_height as usize
    }

    pub fn tile_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Row-major index of the tile containing (x, y)
    pub fn tile_index_of(&self, x: usize, y: usize) -> usize {
        (y / self.tile_height as usize) * self.cols as usize + x / self.tile_width as usize
    }

    /// Pixel rectangle `(x, y, width, height)` of a tile
    pub fn tile_rect(&self, index: usize) -> Option<(usize, usize, usize, usize)> {
        if index >= self.tile_count() {
            return None;
        }
        let tw = self.tile_width as usize;
        let th = self.tile_height as usize;
        let col = index % self.cols as usize;
        let row = index / self.cols as usize;
        Some((col * tw, row * th, tw, th))
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Enable or disable one tile
    pub fn set_tile_active(&mut self, index: usize, active: bool) -> Result<(), LayoutError> {
        let count = self.tile_count();
        let slot = self
            .active
            .get_mut(index)
            .ok_or(LayoutError::TileOutOfRange { index, count })?;
        *slot = active;
        Ok(())
    }

    /// Change the tile grid
    ///
    /// Resets the mask to all-active. Returns whether the grid changed; the
    /// caller must reallocate anything sized to the canvas when it did.
    pub fn resize(&mut self, rows: u8, cols: u8) -> Result<bool, LayoutError> {
        let count = check_layout(rows, cols)?;
        if rows == self.rows && cols == self.cols {
            return Ok(false);
        }
        self.rows = rows;
        self.cols = cols;
        self.active = all_active(count);
        Ok(true)
    }

    /// Blank every pixel of every disabled tile
    pub fn apply_mask(&self, frame: &mut PixelBuffer) {
        for index in 0..self.tile_count() {
            if self.is_active(index) {
                continue;
            }
            if let Some((x, y, w, h)) = self.tile_rect(index) {
                frame.fill_rect(x, y, w, h, Color16::BLACK);
            }
        }
    }

    /// Draw 1-px guides on every interior tile boundary
    pub fn draw_seams(&self, frame: &mut PixelBuffer) {
        let height = frame.height();
        let width = frame.width();
        for col in 1..self.cols as usize {
            frame.fill_rect(col * self.tile_width as usize, 0, 1, height, SEAM_COLOR);
        }
        for row in 1..self.rows as usize {
            frame.fill_rect(0, row * self.tile_height as usize, width, 1, SEAM_COLOR);
        }
    }

    /// Snapshot of the grid and mask for reporting
    pub fn info(&self) -> PanelInfo {
        let mut tiles = Vec::new();
        for index in 0..self.tile_count() {
            let _ = tiles.push(TileInfo {
                index,
                label: tile_label(index),
                active: self.is_active(index),
            });
        }
        PanelInfo {
            rows: self.rows,
            cols: self.cols,
            tiles,
        }
    }
}
