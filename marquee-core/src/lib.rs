//! Board-agnostic display core for tiled LED matrix panels
//!
//! This crate contains everything between an uploaded pixel blob and the
//! frame handed to the panel driver:
//!
//! - Pixel buffer and alpha compositor
//! - Panel layout mapper (tiles, masking, seam guides)
//! - Marquee scheduler and frame pacer
//! - Display mode state machine
//! - Render configuration, hardware defaults and speed units
//! - Versioned snapshot persistence
//! - The render engine and the cooperative control loop
//!
//! Hardware lives behind the traits in `marquee-hal`; the wire format lives
//! in `marquee-protocol`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod compositor;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod layout;
pub mod marquee;
pub mod pixel;
pub mod snapshot;
pub mod state;

pub use controller::{Controller, Request, Response};
pub use engine::RenderEngine;
pub use error::EngineError;
pub use pixel::PixelBuffer;
