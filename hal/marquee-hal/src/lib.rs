//! Marquee Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the display core talks to.
//! Board crates implement them on top of their panel driver and flash
//! file system, so the same compositor and animation code runs on any
//! matrix controller.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Board firmware (HTTP, Wi-Fi, drivers)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  marquee-core (engine, codec, loop)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  marquee-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`display::DisplaySink`] - Full-frame presentation and brightness
//! - [`store::KeyValueStore`] - Small typed settings
//! - [`store::FileStore`] - Large binary payloads (frames, bitmaps)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod display;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod store;

// Re-export key traits at crate root for convenience
pub use display::DisplaySink;
pub use store::{FileKey, FileStore, KeyValueStore, StorageKey, StoreError};
