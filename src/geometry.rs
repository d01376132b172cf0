//! Geometric value types for the indoor location model.
//!
//! This module defines the primitive vocabulary everything else is built on:
//! points, oriented points, and oriented line segments. All types are small
//! `Copy` values, immutable after construction, with pure operations and no
//! failure modes: an undefined orientation is an explicit, valid state, not
//! an error.
//!
//! Angle convention used throughout the crate: orientations are in degrees,
//! counted clockwise from the local frame's +Y ("north") axis. The unit
//! vector for an orientation θ is `(sin θ, cos θ)`.

use serde::{Deserialize, Serialize};

/// Tolerance for coordinate comparisons within the local frame.
///
/// Coordinates are wall measurements in meters; a tenth of a millimeter is
/// well below anything the upstream surveying process can resolve.
pub const GEOMETRY_EPSILON: f64 = 1e-4;

/// Converts an orientation in degrees (clockwise from +Y) to its unit vector.
#[inline]
pub fn orientation_vector(degrees: f64) -> (f64, f64) {
    let radians = degrees.to_radians();
    (radians.sin(), radians.cos())
}

/// Converts a direction vector to an orientation in degrees (clockwise from
/// +Y), normalized to `[0, 360)`.
#[inline]
pub fn vector_orientation(dx: f64, dy: f64) -> f64 {
    let degrees = dx.atan2(dy).to_degrees();
    degrees.rem_euclid(360.0)
}

/// A point in the location's local frame, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate in meters.
    pub x: f64,
    /// Y coordinate in meters.
    pub y: f64,
}

impl Point {
    /// Creates a point at `(x, y)`.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns a new point translated by the vector `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Length of the vector from the origin to this point.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Coordinate equality within [`GEOMETRY_EPSILON`].
    pub fn almost_eq(&self, other: &Point) -> bool {
        self.distance_to(other) <= GEOMETRY_EPSILON
    }
}

/// A point with an optional orientation.
///
/// Orientation is in degrees, counted clockwise; `None` means undefined.
/// The wire format encodes the undefined state as a `-1` sentinel, but that
/// sentinel exists only on the serialization boundary (see `records`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedPoint {
    /// Position in the local frame.
    pub position: Point,
    /// Orientation in degrees, clockwise from +Y, if defined.
    pub orientation: Option<f64>,
}

impl OrientedPoint {
    /// Creates an oriented point at `(x, y)` with the given orientation.
    pub const fn new(x: f64, y: f64, orientation: f64) -> Self {
        Self {
            position: Point::new(x, y),
            orientation: Some(orientation),
        }
    }

    /// Creates an oriented point with undefined orientation.
    pub const fn without_orientation(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            orientation: None,
        }
    }

    /// Creates an oriented point from a plain point and an orientation.
    pub const fn from_point(point: Point, orientation: Option<f64>) -> Self {
        Self {
            position: point,
            orientation,
        }
    }

    /// X coordinate of the point.
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Y coordinate of the point.
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Returns a new oriented point translated by `(dx, dy)`.
    ///
    /// Orientation is preserved.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            position: self.position.translated(dx, dy),
            orientation: self.orientation,
        }
    }

    /// Positional equality within tolerance plus exact orientation equality.
    pub fn almost_eq(&self, other: &OrientedPoint) -> bool {
        self.position.almost_eq(&other.position) && self.orientation == other.orientation
    }
}

/// A line segment with an optional orientation.
///
/// The orientation, when defined, points away from the segment,
/// conventionally toward the interior of the enclosing polygon (the inward
/// normal of a boundary wall).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedLineSegment {
    /// First endpoint.
    pub point1: Point,
    /// Second endpoint.
    pub point2: Point,
    /// Orientation in degrees, clockwise from +Y, if defined.
    pub orientation: Option<f64>,
}

impl OrientedLineSegment {
    /// Creates a segment between two points with the given orientation.
    pub const fn new(point1: Point, point2: Point, orientation: f64) -> Self {
        Self {
            point1,
            point2,
            orientation: Some(orientation),
        }
    }

    /// Creates a segment with undefined orientation.
    pub const fn without_orientation(point1: Point, point2: Point) -> Self {
        Self {
            point1,
            point2,
            orientation: None,
        }
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.point1.distance_to(&self.point2)
    }

    /// Center point of the segment, inheriting the segment's orientation.
    pub fn center(&self) -> OrientedPoint {
        OrientedPoint {
            position: Point::new(
                (self.point1.x + self.point2.x) / 2.0,
                (self.point1.y + self.point2.y) / 2.0,
            ),
            orientation: self.orientation,
        }
    }

    /// Left endpoint of the segment, as seen by an observer the segment's
    /// orientation points at.
    ///
    /// Returns `None` when the segment has no orientation. The returned point
    /// inherits the segment's orientation.
    pub fn left_point(&self) -> Option<OrientedPoint> {
        self.classify_endpoints().map(|(left, _)| left)
    }

    /// Right endpoint of the segment, as seen by an observer the segment's
    /// orientation points at.
    ///
    /// Returns `None` when the segment has no orientation. The returned point
    /// inherits the segment's orientation.
    pub fn right_point(&self) -> Option<OrientedPoint> {
        self.classify_endpoints().map(|(_, right)| right)
    }

    /// Returns a new segment translated by `(dx, dy)`, preserving orientation.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            point1: self.point1.translated(dx, dy),
            point2: self.point2.translated(dx, dy),
            orientation: self.orientation,
        }
    }

    /// Endpoint equality within tolerance plus exact orientation equality.
    pub fn almost_eq(&self, other: &OrientedLineSegment) -> bool {
        self.point1.almost_eq(&other.point1)
            && self.point2.almost_eq(&other.point2)
            && self.orientation == other.orientation
    }

    /// Classifies the endpoints into (left, right) relative to the
    /// orientation vector.
    ///
    /// An observer the orientation points at is facing the opposite of the
    /// orientation vector `v`; their left-hand direction is `(v.y, -v.x)`.
    /// An endpoint lies on the observer's left when its offset from the
    /// segment center has a positive component along that direction, which
    /// is the sign of the cross product between the segment direction and
    /// `v`.
    fn classify_endpoints(&self) -> Option<(OrientedPoint, OrientedPoint)> {
        let degrees = self.orientation?;
        let (vx, vy) = orientation_vector(degrees);
        let center = self.center().position;
        let (dx, dy) = (self.point1.x - center.x, self.point1.y - center.y);
        let toward_left = dx * vy - dy * vx;
        let (left, right) = if toward_left > 0.0 {
            (self.point1, self.point2)
        } else {
            (self.point2, self.point1)
        };
        Some((
            OrientedPoint::from_point(left, self.orientation),
            OrientedPoint::from_point(right, self.orientation),
        ))
    }
}
