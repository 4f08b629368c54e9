// src/error.rs
//! Error types. Structural mistakes fail fast through `PlacementError`;
//! world-state conflicts are never errors and live in plans/outcomes instead.

use bevy::math::{IVec3, UVec3};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("coordinate {coord} is outside the structure bounds {size}")]
    OutOfBounds { coord: IVec3, size: UVec3 },
    #[error("rotation must be one of 0, 90, 180 or 270 degrees, got {0}")]
    InvalidRotation(i32),
    #[error("structure dimensions must be non-zero, got {0}")]
    InvalidDimensions(UVec3),
    #[error("origin {origin} lies outside the structure bounds {size}")]
    OriginOutOfBounds { origin: IVec3, size: UVec3 },
    #[error("anchor '{name}' at {coord} lies outside the structure bounds {size}")]
    AnchorOutOfBounds { name: String, coord: IVec3, size: UVec3 },
    #[error("unknown anchor '{0}'")]
    UnknownAnchor(String),
}

/// Reason a host refused a single write.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("write rejected at {coord}: {reason}")]
pub struct WriteRejected {
    pub coord: IVec3,
    pub reason: String,
}

impl WriteRejected {
    pub fn new(coord: IVec3, reason: impl Into<String>) -> Self {
        Self { coord, reason: reason.into() }
    }
}
