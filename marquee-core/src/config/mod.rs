//! Configuration types
//!
//! Hardware defaults come from TOML; the render configuration is built from
//! them and then edited by uploads.

pub mod hardware;
pub mod speed;
pub mod types;

pub use hardware::*;
pub use speed::*;
pub use types::*;
