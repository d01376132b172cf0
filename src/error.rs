//! Error taxonomy for the indoor location core.
//!
//! Builder errors are returned synchronously from placement calls and
//! `build()`; runtime tracking errors are surfaced once per occurrence to
//! observers and never change monitoring state. Retry policy belongs to the
//! upstream positioning engine, not this crate.

use crate::types::TrackingFault;

/// Top-level error type for the crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndoorError {
    /// The location boundary is missing or malformed.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryFault),

    /// A segment-relative placement does not fit its boundary segment.
    #[error("invalid placement: {0}")]
    InvalidPlacement(#[from] PlacementFault),

    /// The upstream tracking stack is unusable.
    #[error("tracking unavailable: {}", .0.description())]
    TrackingUnavailable(TrackingFault),

    /// A fix could not be reconciled with the monitored boundary.
    #[error("position is outside the location")]
    PositionOutsideLocation,
}

/// Why a boundary failed validation at build time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryFault {
    /// `build()` was called before any boundary points were set.
    #[error("boundary points were never set")]
    BoundaryNotSet,

    /// A polygon needs at least three vertices.
    #[error("boundary has {0} points, need at least 3")]
    TooFewPoints(usize),

    /// Non-adjacent boundary segments cross each other.
    #[error("boundary polygon is self-intersecting")]
    SelfIntersecting,

    /// The boundary encloses no area, e.g. all points are collinear.
    #[error("boundary polygon encloses no area")]
    ZeroArea,

    /// Two beacons in the same location share an identifier.
    #[error("duplicate beacon identifier {0:?}")]
    DuplicateBeacon(String),

    /// Two pins in the same location share an identifier.
    #[error("duplicate pin identifier {0}")]
    DuplicatePin(i64),
}

/// Why a segment-relative placement was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementFault {
    /// The boundary has no segment with the given index.
    #[error("segment index {index} out of range, boundary has {segment_count} segments")]
    UnknownSegment {
        /// Requested segment index.
        index: usize,
        /// Number of segments derived from the boundary points.
        segment_count: usize,
    },

    /// The measured distance (or distance plus object length) walks past the
    /// far end of the segment.
    #[error("placement at {distance} m exceeds segment length {limit} m")]
    OutOfBounds {
        /// Distance from the anchor, plus the object length if any.
        distance: f64,
        /// Length of the anchoring segment.
        limit: f64,
    },
}
