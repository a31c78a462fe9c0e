//! Marquee animation
//!
//! Head positions for the scrolling bitmap, and the pacer that decides when
//! the next animation tick is due.

pub mod heads;
pub mod pacer;

pub use heads::{head_count, Marquee, MIN_HEADS};
pub use pacer::FramePacer;
