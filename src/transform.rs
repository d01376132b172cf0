//! Rigid-body mapping between a foreign tracking frame and a location's
//! local frame.
//!
//! Some positioning engines (camera-tracking subsystems in particular)
//! report positions in their own coordinate frame. Frame alignment itself is
//! performed by the engine; this transform only applies the resulting
//! rotation and translation. Both frames share the same linear unit, so no
//! scaling is ever applied and the mapping is exactly invertible.

use crate::geometry::Point;

/// An invertible rotation-plus-translation between two planar frames.
///
/// `to_foreign` applies a clockwise rotation by `rotation_deg` followed by
/// the `offset` translation; `to_local` is the exact inverse. Pure and
/// side-effect-free, callable from any context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    /// Rotation between the frames in degrees, clockwise.
    pub rotation_deg: f64,
    /// Position of the local frame's origin in the foreign frame.
    pub offset: Point,
}

impl Default for FrameTransform {
    /// The identity transform.
    fn default() -> Self {
        Self {
            rotation_deg: 0.0,
            offset: Point::new(0.0, 0.0),
        }
    }
}

impl FrameTransform {
    /// Creates a transform with the given rotation and offset.
    pub fn new(rotation_deg: f64, offset: Point) -> Self {
        Self { rotation_deg, offset }
    }

    /// Composes the location's own orientation with the heading the engine
    /// reported for its frame, establishing the rigid-body parameters once
    /// tracking begins.
    pub fn aligning(location_orientation_deg: f64, frame_heading_deg: f64, offset: Point) -> Self {
        Self {
            rotation_deg: frame_heading_deg - location_orientation_deg,
            offset,
        }
    }

    /// Maps a point from the foreign tracking frame into the local frame.
    pub fn to_local(&self, foreign: Point) -> Point {
        let shifted = Point::new(foreign.x - self.offset.x, foreign.y - self.offset.y);
        rotate_cw(shifted, -self.rotation_deg)
    }

    /// Maps a point from the local frame into the foreign tracking frame.
    pub fn to_foreign(&self, local: Point) -> Point {
        let rotated = rotate_cw(local, self.rotation_deg);
        Point::new(rotated.x + self.offset.x, rotated.y + self.offset.y)
    }

    /// Maps an orientation (degrees clockwise from the frame's north) from
    /// the foreign frame into the local frame. The translation does not
    /// affect directions, only the rotation does.
    pub fn to_local_orientation(&self, foreign_deg: f64) -> f64 {
        (foreign_deg - self.rotation_deg).rem_euclid(360.0)
    }

    /// Maps an orientation from the local frame into the foreign frame.
    pub fn to_foreign_orientation(&self, local_deg: f64) -> f64 {
        (local_deg + self.rotation_deg).rem_euclid(360.0)
    }
}

/// Rotates a vector clockwise by the given angle in degrees.
fn rotate_cw(p: Point, degrees: f64) -> Point {
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    Point::new(p.x * cos + p.y * sin, -p.x * sin + p.y * cos)
}
