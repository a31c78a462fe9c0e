//! Marquee Upload Protocol
//!
//! This crate defines the bit-exact format in which pre-rendered text
//! bitmaps reach the panel controller, and the named options that travel
//! alongside each upload. Text shaping happens upstream (in the browser);
//! the controller only ever sees ready pixels.
//!
//! # Wire Format
//!
//! Every upload is a 4-byte header followed by one of two pixel encodings:
//! ```text
//! ┌─────────┬──────────┬──────────────────────────────────────┐
//! │ WIDTH   │ HEIGHT   │ PIXELS                               │
//! │ u16 LE  │ u16 LE   │ w*h × u16 LE            (RGB565)     │
//! │         │          │ w*h × [u8 A, u16 LE]    (A8+RGB565)  │
//! └─────────┴──────────┴──────────────────────────────────────┘
//! ```
//!
//! There is no magic, no version and no checksum; the payload length alone
//! selects the encoding.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod color;
pub mod options;
pub mod upload;

pub use color::Color16;
pub use options::{BackgroundMode, Direction, UploadOptions};
pub use upload::{
    decode_upload, Bitmap, DecodeLimits, Encoding, UploadError, UploadReceiver, HEADER_LEN,
};
