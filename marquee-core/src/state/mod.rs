//! Display mode state machine
//!
//! Decides whether the core animates and whether it presents at all.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::DisplayMode;
