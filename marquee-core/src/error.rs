//! Engine-level errors
//!
//! Every error here is local and recoverable: the previously active bitmap,
//! canvas and configuration are left untouched when one is returned.

use core::fmt;

use marquee_protocol::UploadError;

use crate::layout::LayoutError;
use crate::snapshot::SnapshotError;

/// Errors surfaced to the request layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Upload failed to decode
    Upload(UploadError),
    /// Layout change or tile lookup failed
    Layout(LayoutError),
    /// Persistence failed
    Snapshot(SnapshotError),
}

impl From<UploadError> for EngineError {
    fn from(e: UploadError) -> Self {
        EngineError::Upload(e)
    }
}

impl From<LayoutError> for EngineError {
    fn from(e: LayoutError) -> Self {
        EngineError::Layout(e)
    }
}

impl From<SnapshotError> for EngineError {
    fn from(e: SnapshotError) -> Self {
        EngineError::Snapshot(e)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload(e) => write!(f, "upload rejected: {}", e),
            Self::Layout(e) => write!(f, "layout rejected: {}", e),
            Self::Snapshot(e) => write!(f, "snapshot failed: {}", e),
        }
    }
}
